//! SQLite implementation of the data gateway.
//!
//! Uses prepared statements and transactions for data integrity.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use super::Gateway;
use crate::auth::{hash_password, new_salt, verify_password};
use crate::errors::AppError;
use crate::models::{
    AuthUser, Product, ProductInput, ProductQuery, ProductRows, Settings, SettingsInput,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, promo_price, promo_active, image_url, category, created_at, updated_at";

const SETTINGS_COLUMNS: &str = "id, shop_name, logo_url, whatsapp_number, presentation_video_url, primary_color, created_at, updated_at";

/// Microsecond timestamps keep lexical and chronological order identical.
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite-backed gateway.
#[derive(Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the settings row if none exists yet. Returns the row in effect.
    pub async fn provision_settings(&self, input: &SettingsInput) -> Result<Settings, AppError> {
        if let Some(existing) = self.get_settings().await? {
            return Ok(existing);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = now();

        sqlx::query(
            "INSERT INTO settings (id, shop_name, logo_url, whatsapp_number, presentation_video_url, primary_color, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&input.shop_name)
        .bind(&input.logo_url)
        .bind(&input.whatsapp_number)
        .bind(&input.presentation_video_url)
        .bind(&input.primary_color)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!("Provisioned settings row for {}", input.shop_name);

        Ok(Settings {
            id,
            shop_name: input.shop_name.clone(),
            logo_url: input.logo_url.clone(),
            whatsapp_number: input.whatsapp_number.clone(),
            presentation_video_url: input.presentation_video_url.clone(),
            primary_color: input.primary_color.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Create a user, or reset the password of an existing one, and grant roles.
    pub async fn upsert_user(
        &self,
        email: &str,
        password: &str,
        roles: &[&str],
    ) -> Result<AuthUser, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;

        let salt = new_salt();
        let hash = hash_password(&salt, password);

        let id = match existing {
            Some(row) => {
                let id: String = row.get("id");
                sqlx::query("UPDATE users SET password_salt = ?, password_hash = ? WHERE id = ?")
                    .bind(&salt)
                    .bind(&hash)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await?;
                id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO users (id, email, password_salt, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(email)
                .bind(&salt)
                .bind(&hash)
                .bind(now())
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        for role in roles {
            sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
                .bind(&id)
                .bind(*role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(AuthUser {
            id,
            email: email.to_string(),
        })
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn select_products(&self, query: &ProductQuery) -> Result<ProductRows, AppError> {
        let filter = if query.category.is_some() {
            " WHERE category = ?"
        } else {
            ""
        };

        let total_sql = format!("SELECT COUNT(*) FROM products{}", filter);
        let mut total_query = sqlx::query_scalar::<_, i64>(&total_sql);
        if let Some(category) = &query.category {
            total_query = total_query.bind(category);
        }

        let mut rows_sql = format!(
            "SELECT {} FROM products{} ORDER BY created_at DESC, rowid DESC",
            PRODUCT_COLUMNS, filter
        );
        if query.range.is_some() {
            rows_sql.push_str(" LIMIT ? OFFSET ?");
        }
        let mut rows_query = sqlx::query(&rows_sql);
        if let Some(category) = &query.category {
            rows_query = rows_query.bind(category);
        }
        if let Some((offset, limit)) = query.range {
            rows_query = rows_query.bind(limit).bind(offset);
        }

        // Count and rows from one snapshot
        let mut tx = self.pool.begin().await?;
        let total_count = total_query.fetch_one(&mut *tx).await?;
        let rows = rows_query.fetch_all(&mut *tx).await?;
        tx.commit().await?;

        Ok(ProductRows {
            items: rows.iter().map(product_from_row).collect(),
            total_count,
        })
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    async fn product_categories(&self) -> Result<Vec<String>, AppError> {
        let categories =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM products ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn insert_product(&self, input: &ProductInput) -> Result<Product, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now();

        sqlx::query(
            "INSERT INTO products (id, name, description, price, promo_price, promo_active, image_url, category, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.promo_price)
        .bind(input.promo_active as i32)
        .bind(&input.image_url)
        .bind(&input.category)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            promo_price: input.promo_price,
            promo_active: input.promo_active,
            image_url: input.image_url.clone(),
            category: input.category.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, AppError> {
        let result = sqlx::query(
            "UPDATE products SET name = ?, description = ?, price = ?, promo_price = ?, promo_active = ?, image_url = ?, category = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.promo_price)
        .bind(input.promo_active as i32)
        .bind(&input.image_url)
        .bind(&input.category)
        .bind(now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        self.get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        Ok(())
    }

    async fn get_settings(&self) -> Result<Option<Settings>, AppError> {
        let sql = format!(
            "SELECT {} FROM settings ORDER BY created_at LIMIT 1",
            SETTINGS_COLUMNS
        );
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(settings_from_row))
    }

    async fn update_settings(
        &self,
        id: &str,
        input: &SettingsInput,
    ) -> Result<Settings, AppError> {
        let result = sqlx::query(
            "UPDATE settings SET shop_name = ?, logo_url = ?, whatsapp_number = ?, presentation_video_url = ?, primary_color = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&input.shop_name)
        .bind(&input.logo_url)
        .bind(&input.whatsapp_number)
        .bind(&input.presentation_video_url)
        .bind(&input.primary_color)
        .bind(now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Settings {} not found", id)));
        }

        let sql = format!("SELECT {} FROM settings WHERE id = ?", SETTINGS_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(settings_from_row(&row))
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthUser>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, password_salt, password_hash FROM users WHERE email = ?",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let salt: String = row.get("password_salt");
        let hash: String = row.get("password_hash");
        if !verify_password(&salt, password, &hash) {
            return Ok(None);
        }

        Ok(Some(AuthUser {
            id: row.get("id"),
            email: row.get("email"),
        }))
    }

    async fn roles_for(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = ? ORDER BY role",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }
}

// Helper functions for row conversion

fn product_from_row(row: &sqlx::sqlite::SqliteRow) -> Product {
    let promo_active: i32 = row.get("promo_active");
    Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        promo_price: row.get("promo_price"),
        promo_active: promo_active != 0,
        image_url: row.get("image_url"),
        category: row.get("category"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn settings_from_row(row: &sqlx::sqlite::SqliteRow) -> Settings {
    Settings {
        id: row.get("id"),
        shop_name: row.get("shop_name"),
        logo_url: row.get("logo_url"),
        whatsapp_number: row.get("whatsapp_number"),
        presentation_video_url: row.get("presentation_video_url"),
        primary_color: row.get("primary_color"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
