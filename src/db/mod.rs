//! Data gateway for catalog, settings and auth data.
//!
//! The rest of the backend talks to the [`Gateway`] trait only; SQLite is the shipped
//! implementation.

mod repository;
#[cfg(test)]
pub mod testing;

pub use repository::*;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{
    AuthUser, Product, ProductInput, ProductQuery, ProductRows, Settings, SettingsInput,
};

/// Table-oriented query/mutation contract of the backing store.
///
/// Listings are always ordered newest-created first. Every mutation is atomic per call.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Select products with an exact count of all rows matching the filter.
    async fn select_products(&self, query: &ProductQuery) -> Result<ProductRows, AppError>;

    async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError>;

    /// Distinct categories across all products, sorted.
    async fn product_categories(&self) -> Result<Vec<String>, AppError>;

    async fn insert_product(&self, input: &ProductInput) -> Result<Product, AppError>;

    /// Replace every editable field of a product. Unknown ids are `NotFound`.
    async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, AppError>;

    /// Hard delete. Unknown ids are `NotFound`.
    async fn delete_product(&self, id: &str) -> Result<(), AppError>;

    /// The settings row, or `None` when the shop has not been configured yet.
    async fn get_settings(&self) -> Result<Option<Settings>, AppError>;

    async fn update_settings(&self, id: &str, input: &SettingsInput)
        -> Result<Settings, AppError>;

    /// Verify credentials. `None` when the email is unknown or the password is wrong.
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<Option<AuthUser>, AppError>;

    async fn roles_for(&self, user_id: &str) -> Result<Vec<String>, AppError>;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            price INTEGER NOT NULL,
            promo_price INTEGER,
            promo_active INTEGER NOT NULL DEFAULT 0,
            image_url TEXT,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            id TEXT PRIMARY KEY,
            shop_name TEXT NOT NULL,
            logo_url TEXT NOT NULL DEFAULT '',
            whatsapp_number TEXT NOT NULL DEFAULT '',
            presentation_video_url TEXT NOT NULL DEFAULT '',
            primary_color TEXT NOT NULL DEFAULT '#32CD32',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            role TEXT NOT NULL,
            PRIMARY KEY (user_id, role)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at);
        CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
