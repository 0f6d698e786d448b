//! Storefront Backend
//!
//! Multi-tenant storefront catalog service with SQLite persistence, cached catalog reads,
//! file-backed carts and WhatsApp checkout.

mod api;
mod auth;
mod cart;
mod catalog;
mod checkout;
mod config;
mod db;
mod errors;
mod models;
mod notify;
mod oembed;
mod settings;
mod storage;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{AdminGuard, SessionManager};
use cart::{CartService, FileCartStore};
use catalog::{CatalogMutations, CatalogQuery, CatalogTtl, CategorySet};
use config::Config;
use db::{Gateway, SqliteGateway};
use errors::AppError;
use models::SettingsInput;
use notify::{LogNotifier, Notifier};
use oembed::OEmbedClient;
use settings::{SettingsService, DEFAULT_PRIMARY_COLOR};
use storage::BlobStore;

/// Largest accepted upload body; bucket limits are enforced by the blob store.
const UPLOAD_BODY_LIMIT: usize = 11 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogQuery>,
    pub mutations: Arc<CatalogMutations>,
    pub settings: Arc<SettingsService>,
    pub carts: Arc<CartService>,
    pub sessions: Arc<SessionManager>,
    pub blobs: Arc<BlobStore>,
    pub oembed: Arc<OEmbedClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire every service around one gateway.
    pub fn build(
        config: Config,
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let catalog = Arc::new(CatalogQuery::new(
            gateway.clone(),
            CategorySet::new(config.categories.iter().cloned()),
            CatalogTtl {
                products: config.products_ttl,
                categories: config.categories_ttl,
            },
        ));
        let mutations = Arc::new(CatalogMutations::new(
            gateway.clone(),
            catalog.clone(),
            notifier.clone(),
        ));
        let settings = Arc::new(SettingsService::new(
            gateway.clone(),
            notifier,
            config.shop_name.clone(),
            config.settings_ttl,
        ));
        let carts = Arc::new(CartService::new(
            FileCartStore::new(&config.carts_dir),
            catalog.clone(),
            settings.clone(),
            config.currency.clone(),
        ));

        Ok(Self {
            catalog,
            mutations,
            settings,
            carts,
            sessions: Arc::new(SessionManager::new(gateway, config.session_ttl)),
            blobs: Arc::new(BlobStore::new(
                &config.storage_dir,
                config.public_base_url.clone(),
            )),
            oembed: Arc::new(OEmbedClient::new(config.oembed_endpoint.clone())?),
            config: Arc::new(config),
        })
    }

    /// No admin key and no administrator account: the admin API is open.
    pub fn admin_guard(&self) -> AdminGuard {
        AdminGuard {
            psk: self.config.admin_psk.clone(),
            sessions: self.sessions.clone(),
            open: self.config.admin_psk.is_none() && self.config.admin_email.is_none(),
        }
    }

    pub async fn shutdown(&self) {
        self.sessions.clear().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let json = config.log_format == "json";

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Storefront Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Storage path: {:?}", config.storage_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let gateway = SqliteGateway::new(pool.clone());

    provision(&config, &gateway).await?;

    let state = AppState::build(config.clone(), Arc::new(gateway), Arc::new(LogNotifier))?;
    state.blobs.ensure_buckets().await?;

    // Audit session changes until shutdown
    let mut session_events = state.sessions.subscribe();
    tokio::spawn(async move {
        while session_events.changed().await.is_ok() {
            let event = session_events.borrow_and_update().clone();
            tracing::debug!(?event, "Session state changed");
        }
    });

    let guard = state.admin_guard();
    if guard.open {
        tracing::warn!(
            "No admin key (STOREFRONT_ADMIN_PSK) or admin account configured. Admin API is open!"
        );
    }

    // Build router
    let app = create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Seed the administrator account and the settings row from configuration.
async fn provision(config: &Config, gateway: &SqliteGateway) -> Result<(), AppError> {
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let user = gateway.upsert_user(email, password, &["admin"]).await?;
        tracing::info!("Administrator account ready: {}", user.email);
    }

    if let Some(number) = &config.whatsapp_number {
        gateway
            .provision_settings(&SettingsInput {
                shop_name: config.shop_name.clone(),
                logo_url: String::new(),
                whatsapp_number: number.clone(),
                presentation_video_url: String::new(),
                primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            })
            .await?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let guard = state.admin_guard();

    // Admin routes
    let admin_routes = Router::new()
        .route("/products", post(api::create_product))
        .route(
            "/products/{id}",
            put(api::update_product).delete(api::delete_product),
        )
        .route("/settings", put(api::update_settings))
        .route(
            "/uploads/{bucket}",
            post(api::upload_blob).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Apply admin auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(guard.clone(), req, next)
        }));

    // Public API routes
    let api_routes = Router::new()
        // Catalog
        .route("/products", get(api::list_products))
        .route("/products/{id}", get(api::get_product))
        .route("/products/{id}/whatsapp", get(api::product_enquiry))
        .route("/promotions", get(api::list_promotions))
        .route("/categories", get(api::list_categories))
        .route("/categories/available", get(api::available_categories))
        // Settings
        .route("/settings", get(api::get_settings))
        // Video previews
        .route("/oembed", get(api::oembed_preview))
        // Auth
        .route("/auth/sign-in", post(api::sign_in))
        .route("/auth/session", get(api::current_session))
        .route("/auth/sign-out", post(api::sign_out))
        // Carts
        .route(
            "/carts/{cart_id}",
            get(api::get_cart).delete(api::clear_cart),
        )
        .route("/carts/{cart_id}/items", post(api::add_cart_item))
        .route(
            "/carts/{cart_id}/items/{product_id}",
            put(api::set_cart_item_quantity).delete(api::remove_cart_item),
        )
        .route("/carts/{cart_id}/checkout", post(api::checkout_cart))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    let blobs = ServeDir::new(state.blobs.root());

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/storage", blobs)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
