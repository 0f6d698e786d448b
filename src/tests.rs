//! Integration tests for the storefront backend.

use std::sync::Arc;

use httpmock::prelude::*;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, SqliteGateway};
use crate::models::SettingsInput;
use crate::notify::LogNotifier;
use crate::{create_router, AppState};

const ADMIN_KEY: &str = "test-admin-key";

/// Test fixture for integration tests.
struct TestFixture {
    /// Sends the admin key with every request
    client: Client,
    /// Sends no credentials
    anonymous: Client,
    base_url: String,
    gateway: SqliteGateway,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        let mut config = Config::from_lookup(|_| None).expect("Failed to build config");
        config.admin_psk = Some(ADMIN_KEY.to_string());
        config.db_path = temp_dir.path().join("test.sqlite");
        config.storage_dir = temp_dir.path().join("storage");
        config.carts_dir = temp_dir.path().join("carts");
        config.public_base_url = base_url.clone();
        config.bind_addr = addr;
        config.log_level = "warn".to_string();
        config.categories = vec!["Parfums".to_string(), "Cheveux".to_string()];
        adjust(&mut config);

        // Initialize database
        let pool = init_database(&config.db_path)
            .await
            .expect("Failed to init DB");
        let gateway = SqliteGateway::new(pool);

        let state = AppState::build(config, Arc::new(gateway.clone()), Arc::new(LogNotifier))
            .expect("Failed to build state");
        let app = create_router(state);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-api-key", ADMIN_KEY.parse().unwrap());

        TestFixture {
            client: Client::builder().default_headers(headers).build().unwrap(),
            anonymous: Client::new(),
            base_url,
            gateway,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn provision_settings(&self, whatsapp_number: &str) {
        self.gateway
            .provision_settings(&SettingsInput {
                shop_name: "Bio Shop".to_string(),
                logo_url: "https://cdn.example.com/logo.png".to_string(),
                whatsapp_number: whatsapp_number.to_string(),
                presentation_video_url: String::new(),
                primary_color: "#32CD32".to_string(),
            })
            .await
            .unwrap();
    }

    async fn create_product(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/admin/products"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.anonymous.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

fn product(name: &str, category: &str, price: i64) -> Value {
    json!({
        "name": name,
        "description": format!("Description of {}", name),
        "price": price,
        "category": category
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_requires_key() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/admin/products"))
        .json(&product("Huile", "Parfums", 1000))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/admin/products"))
        .header("x-api-key", "wrong-key")
        .json(&product("Huile", "Parfums", 1000))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/admin/products"))
        .bearer_auth(ADMIN_KEY)
        .json(&product("Huile", "Parfums", 1000))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Public reads need no credentials
    let (status, _) = fixture.get_json("/api/products").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_pagination_flow() {
    let fixture = TestFixture::new().await;
    for i in 0..12 {
        fixture
            .create_product(product(&format!("Parfum {}", i), "Parfums", 1000 + i))
            .await;
    }

    let (status, body) = fixture.get_json("/api/products?page=2&pageSize=5").await;
    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 5);
    assert_eq!(data["totalCount"], 12);
    assert_eq!(data["totalPages"], 3);
    assert_eq!(data["hasPrevious"], true);
    assert_eq!(data["hasNext"], true);
    assert_eq!(data["filterScope"], "page");

    let (_, body) = fixture.get_json("/api/products?page=3&pageSize=5").await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["hasNext"], false);

    let (_, body) = fixture.get_json("/api/products?paginate=false").await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 12);
    assert_eq!(body["data"]["totalCount"], 12);

    let (status, body) = fixture.get_json("/api/products?page=0").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["field"], "page");

    let (status, body) = fixture
        .get_json("/api/products?page=4294967295&pageSize=4294967295")
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["field"], "pageSize");
}

#[tokio::test]
async fn test_create_invalidates_cached_listing() {
    let fixture = TestFixture::new().await;
    fixture.create_product(product("Ancien", "Parfums", 1000)).await;

    let (_, before) = fixture.get_json("/api/products").await;
    assert_eq!(before["data"]["totalCount"], 1);

    let created = fixture.create_product(product("Nouveau", "Cheveux", 2000)).await;

    let (_, after) = fixture.get_json("/api/products").await;
    assert_eq!(after["data"]["totalCount"], 2);
    assert_eq!(after["data"]["items"][0]["id"], created["id"]);

    let (_, categories) = fixture.get_json("/api/categories").await;
    assert_eq!(categories["data"], json!(["Cheveux", "Parfums"]));

    let (_, available) = fixture.get_json("/api/categories/available").await;
    assert_eq!(available["data"], json!(["Parfums", "Cheveux"]));
}

#[tokio::test]
async fn test_category_filter_and_page_local_search() {
    let fixture = TestFixture::new().await;
    fixture.create_product(product("Shampoing", "Cheveux", 1500)).await;
    fixture.create_product(product("Eau de rose", "Parfums", 5000)).await;
    fixture.create_product(product("Musc blanc", "Parfums", 6000)).await;

    let (_, body) = fixture.get_json("/api/products?category=Parfums").await;
    assert_eq!(body["data"]["totalCount"], 2);

    let (_, body) = fixture.get_json("/api/products?search=ROSE").await;
    let data = &body["data"];
    assert_eq!(data["displayedCount"], 1);
    assert_eq!(data["totalCount"], 3);
    assert_eq!(data["items"][0]["name"], "Eau de rose");

    let (status, body) = fixture.get_json("/api/products?category=Chaussures").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_promotions_and_promo_filter() {
    let fixture = TestFixture::new().await;
    let mut promo = product("Promo", "Parfums", 5000);
    promo["promoPrice"] = json!(4000);
    promo["promoActive"] = json!(true);
    fixture.create_product(promo).await;

    let mut flag_only = product("Flag only", "Parfums", 3000);
    flag_only["promoActive"] = json!(true);
    fixture.create_product(flag_only).await;

    fixture.create_product(product("Plain", "Parfums", 2000)).await;

    let (_, body) = fixture.get_json("/api/promotions").await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Promo"]);

    let (_, body) = fixture.get_json("/api/products?promoOnly=true").await;
    assert_eq!(body["data"]["displayedCount"], 2);
}

#[tokio::test]
async fn test_product_validation_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/products"))
        .json(&product("Huile", "Parfums", 0))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "price");

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/products"))
        .json(&product("  ", "Parfums", 100))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let (_, body) = fixture.get_json("/api/products").await;
    assert_eq!(body["data"]["totalCount"], 0);
}

#[tokio::test]
async fn test_update_and_delete_product() {
    let fixture = TestFixture::new().await;
    let created = fixture.create_product(product("Huile", "Parfums", 1000)).await;
    let id = created["id"].as_str().unwrap();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/products/{}", id)))
        .json(&product("Huile d'argan", "Cheveux", 2500))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Product updated");

    let (_, body) = fixture.get_json(&format!("/api/products/{}", id)).await;
    assert_eq!(body["data"]["name"], "Huile d'argan");
    assert_eq!(body["data"]["price"], 2500);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/products/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, body) = fixture.get_json(&format!("/api/products/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/products/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_settings_fallback_and_update() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/settings").await;
    assert_eq!(status, 200);
    let view = &body["data"];
    assert_eq!(view["configured"], false);
    assert_eq!(view["shopName"], "Ma Boutique");
    assert_eq!(view["themeHsl"], "120 61% 50%");
    assert_eq!(view["checkoutAvailable"], false);

    let update = json!({
        "shopName": "Bio Shop",
        "logoUrl": "https://cdn.example.com/logo.png",
        "whatsappNumber": "+228 99 18 16 26",
        "presentationVideoUrl": "https://www.tiktok.com/@shop/video/1",
        "primaryColor": "#FF0000"
    });
    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_settings_update_when_configured() {
    let fixture = TestFixture::new().await;
    fixture.provision_settings("22899181626").await;

    let update = json!({
        "shopName": "Bio Shop",
        "logoUrl": "https://cdn.example.com/logo.png",
        "whatsappNumber": "+228 99 18 16 26",
        "presentationVideoUrl": "https://www.tiktok.com/@shop/video/1",
        "primaryColor": "#FF0000"
    });
    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (_, body) = fixture.get_json("/api/settings").await;
    let view = &body["data"];
    assert_eq!(view["configured"], true);
    assert_eq!(view["shopName"], "Bio Shop");
    assert_eq!(view["themeHsl"], "0 100% 50%");
    assert_eq!(view["checkoutAvailable"], true);

    let mut invalid = update.clone();
    invalid["primaryColor"] = json!("red");
    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_cart_flow_and_checkout() {
    let fixture = TestFixture::new().await;
    let mut input = product("Huile", "Parfums", 2000);
    input["promoPrice"] = json!(1500);
    input["promoActive"] = json!(true);
    let created = fixture.create_product(input).await;
    let id = created["id"].as_str().unwrap();

    for _ in 0..2 {
        let resp = fixture
            .anonymous
            .post(fixture.url("/api/carts/visitor-1/items"))
            .json(&json!({ "productId": id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let (_, body) = fixture.get_json("/api/carts/visitor-1").await;
    assert_eq!(body["data"]["items"][0]["quantity"], 2);
    assert_eq!(body["data"]["total"], 3000);
    assert_eq!(body["data"]["formattedTotal"], "3\u{202F}000 FCFA");

    // Quantities below 1 are ignored
    let resp = fixture
        .anonymous
        .put(fixture.url(&format!("/api/carts/visitor-1/items/{}", id)))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"][0]["quantity"], 2);

    // Not configured yet
    let resp = fixture
        .anonymous
        .post(fixture.url("/api/carts/visitor-1/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CHECKOUT_UNAVAILABLE");

    let (_, body) = fixture.get_json("/api/carts/visitor-1").await;
    assert_eq!(body["data"]["itemCount"], 2);
}

#[tokio::test]
async fn test_checkout_issues_link_and_clears_cart() {
    let fixture = TestFixture::new().await;
    fixture.provision_settings("+228 99 18 16 26").await;
    let created = fixture.create_product(product("Huile", "Parfums", 15000)).await;

    fixture
        .anonymous
        .post(fixture.url("/api/carts/visitor-2/items"))
        .json(&json!({ "productId": created["id"] }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/carts/visitor-2/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/22899181626?text="));
    let message = urlencoding::decode(url.split("?text=").nth(1).unwrap()).unwrap();
    assert!(message.contains("Nouvelle Commande Bio Shop"));
    assert!(message.contains("15\u{202F}000 FCFA"));
    assert_eq!(body["data"]["total"], 15000);

    let (_, body) = fixture.get_json("/api/carts/visitor-2").await;
    assert!(body["data"]["items"].as_array().unwrap().is_empty());

    // Empty cart cannot be checked out
    let resp = fixture
        .anonymous
        .post(fixture.url("/api/carts/visitor-2/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_deleted_product_stays_in_cart() {
    let fixture = TestFixture::new().await;
    let created = fixture.create_product(product("Savon", "Parfums", 800)).await;
    let id = created["id"].as_str().unwrap();

    fixture
        .anonymous
        .post(fixture.url("/api/carts/visitor-3/items"))
        .json(&json!({ "productId": id }))
        .send()
        .await
        .unwrap();
    fixture
        .client
        .delete(fixture.url(&format!("/api/admin/products/{}", id)))
        .send()
        .await
        .unwrap();

    let (_, body) = fixture.get_json("/api/carts/visitor-3").await;
    assert_eq!(body["data"]["items"][0]["name"], "Savon");
    assert_eq!(body["data"]["total"], 800);

    let resp = fixture
        .anonymous
        .delete(fixture.url("/api/carts/visitor-3"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let (_, body) = fixture.get_json("/api/carts/visitor-3").await;
    assert_eq!(body["data"]["itemCount"], 0);
}

#[tokio::test]
async fn test_oembed_proxy() {
    let server = MockServer::start();
    let video = "https://www.tiktok.com/@shop/video/1";
    server.mock(|when, then| {
        when.method(GET).path("/oembed").query_param("url", video);
        then.status(200).json_body(json!({
            "title": "Collection",
            "author_name": "shop",
            "thumbnail_url": "https://p16.example.com/thumb.jpg"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/oembed").query_param("url", "https://broken.example");
        then.status(500).body("boom");
    });

    let endpoint = server.url("/oembed");
    let fixture = TestFixture::with_config(move |config| config.oembed_endpoint = endpoint).await;

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/oembed"))
        .query(&[("url", video)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Collection");
    assert_eq!(body["data"]["videoUrl"], video);

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/oembed"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/oembed"))
        .query(&[("url", "https://broken.example")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_upload_and_serve_blob() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/uploads/logos?filename=logo.png"))
        .header("content-type", "image/png")
        .body(b"\x89PNG fake".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let public_url = body["data"]["publicUrl"].as_str().unwrap().to_string();
    assert!(public_url.starts_with(&fixture.url("/storage/logos/")));
    assert!(public_url.ends_with(".png"));

    let served = fixture.anonymous.get(&public_url).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"\x89PNG fake");

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/uploads/videos?filename=logo.png"))
        .header("content-type", "image/png")
        .body(b"\x89PNG fake".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/uploads/secrets"))
        .header("content-type", "image/png")
        .body(b"x".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_session_sign_in_and_admin_access() {
    let fixture = TestFixture::with_config(|config| {
        config.admin_psk = None;
        config.admin_email = Some("admin@shop.test".to_string());
    })
    .await;
    fixture
        .gateway
        .upsert_user("admin@shop.test", "s3cret", &["admin"])
        .await
        .unwrap();
    fixture
        .gateway
        .upsert_user("staff@shop.test", "staff", &["editor"])
        .await
        .unwrap();

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/auth/sign-in"))
        .json(&json!({ "email": "admin@shop.test", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/auth/sign-in"))
        .json(&json!({ "email": "admin@shop.test", "password": "s3cret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "admin");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/auth/session"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["email"], "admin@shop.test");

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/admin/products"))
        .bearer_auth(&token)
        .json(&product("Huile", "Parfums", 1000))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Non-admin session is refused
    let resp = fixture
        .anonymous
        .post(fixture.url("/api/auth/sign-in"))
        .json(&json!({ "email": "staff@shop.test", "password": "staff" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "member");
    let staff_token = body["data"]["token"].as_str().unwrap().to_string();
    let resp = fixture
        .anonymous
        .post(fixture.url("/api/admin/products"))
        .bearer_auth(&staff_token)
        .json(&product("Savon", "Parfums", 1000))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/auth/sign-out"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], true);

    let resp = fixture
        .anonymous
        .post(fixture.url("/api/admin/products"))
        .bearer_auth(&token)
        .json(&product("Savon", "Parfums", 1000))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_product_enquiry_link() {
    let fixture = TestFixture::new().await;
    let mut input = product("Rouge", "Parfums", 3000);
    input["promoPrice"] = json!(2500);
    input["promoActive"] = json!(true);
    let created = fixture.create_product(input).await;
    let path = format!("/api/products/{}/whatsapp", created["id"].as_str().unwrap());

    let (status, body) = fixture.get_json(&path).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "CHECKOUT_UNAVAILABLE");

    let fixture = TestFixture::new().await;
    fixture.provision_settings("22899181626").await;
    let created = fixture.create_product(product("Rouge", "Parfums", 3000)).await;
    let (status, body) = fixture
        .get_json(&format!(
            "/api/products/{}/whatsapp",
            created["id"].as_str().unwrap()
        ))
        .await;
    assert_eq!(status, 200);
    let url = body["data"]["url"].as_str().unwrap();
    let message = urlencoding::decode(url.split("?text=").nth(1).unwrap()).unwrap();
    assert!(message.contains("*Rouge*"));
    assert!(message.contains("3\u{202F}000 FCFA"));

    let (status, _) = fixture.get_json("/api/products/missing/whatsapp").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_router_serves_without_listener() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.db_path = temp_dir.path().join("oneshot.sqlite");
    config.storage_dir = temp_dir.path().join("storage");
    config.carts_dir = temp_dir.path().join("carts");

    let pool = init_database(&config.db_path).await.unwrap();
    let state = AppState::build(
        config,
        Arc::new(SqliteGateway::new(pool)),
        Arc::new(LogNotifier),
    )
    .unwrap();
    let app = create_router(state);

    let resp = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // No admin key and no admin account: open dev mode
    let resp = app
        .oneshot(
            Request::put("/api/admin/settings")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "shopName": "Dev",
                        "logoUrl": "l",
                        "whatsappNumber": "1",
                        "presentationVideoUrl": "v",
                        "primaryColor": "#000"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
