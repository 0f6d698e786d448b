//! Instrumented gateway for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use super::{init_database, Gateway, SqliteGateway};
use crate::errors::AppError;
use crate::models::{
    AuthUser, Product, ProductInput, ProductQuery, ProductRows, Settings, SettingsInput,
};

pub fn sample_input(name: &str, category: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: Some(format!("Description of {}", name)),
        price: 1000,
        promo_price: None,
        promo_active: false,
        image_url: None,
        category: category.to_string(),
    }
}

#[derive(Default)]
struct Counters {
    selects: AtomicUsize,
    categories: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// SQLite gateway in a temp dir that counts calls and can be told to fail.
#[derive(Clone)]
pub struct TestGateway {
    pub inner: SqliteGateway,
    counters: Arc<Counters>,
    _dir: Arc<TempDir>,
}

impl TestGateway {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("gateway.sqlite"))
            .await
            .unwrap();
        Self {
            inner: SqliteGateway::new(pool),
            counters: Arc::new(Counters::default()),
            _dir: Arc::new(dir),
        }
    }

    pub fn select_calls(&self) -> usize {
        self.counters.selects.load(Ordering::SeqCst)
    }

    pub fn category_calls(&self) -> usize {
        self.counters.categories.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.counters.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.counters.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.counters.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Gateway("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), AppError> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Gateway("permission denied for table products".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for TestGateway {
    async fn select_products(&self, query: &ProductQuery) -> Result<ProductRows, AppError> {
        self.counters.selects.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        self.inner.select_products(query).await
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        self.check_read()?;
        self.inner.get_product(id).await
    }

    async fn product_categories(&self) -> Result<Vec<String>, AppError> {
        self.counters.categories.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        self.inner.product_categories().await
    }

    async fn insert_product(&self, input: &ProductInput) -> Result<Product, AppError> {
        self.check_write()?;
        self.inner.insert_product(input).await
    }

    async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, AppError> {
        self.check_write()?;
        self.inner.update_product(id, input).await
    }

    async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        self.check_write()?;
        self.inner.delete_product(id).await
    }

    async fn get_settings(&self) -> Result<Option<Settings>, AppError> {
        self.check_read()?;
        self.inner.get_settings().await
    }

    async fn update_settings(
        &self,
        id: &str,
        input: &SettingsInput,
    ) -> Result<Settings, AppError> {
        self.check_write()?;
        self.inner.update_settings(id, input).await
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthUser>, AppError> {
        self.inner.authenticate(email, password).await
    }

    async fn roles_for(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        self.inner.roles_for(user_id).await
    }
}
