//! Write side of the catalog.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::{CatalogQuery, CategorySet};
use crate::db::Gateway;
use crate::errors::AppError;
use crate::models::{Product, ProductInput};
use crate::notify::{Notification, Notifier};

/// Ids with a mutation outstanding.
#[derive(Default)]
struct InFlight(Mutex<HashSet<String>>);

impl InFlight {
    fn acquire(self: &Arc<Self>, id: &str) -> Result<InFlightGuard, AppError> {
        let mut ids = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if !ids.insert(id.to_string()) {
            return Err(AppError::Conflict(format!(
                "A change to product {} is already in progress",
                id
            )));
        }
        Ok(InFlightGuard {
            owner: self.clone(),
            id: id.to_string(),
        })
    }
}

struct InFlightGuard {
    owner: Arc<InFlight>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut ids = self.owner.0.lock().unwrap_or_else(|e| e.into_inner());
        ids.remove(&self.id);
    }
}

/// Validate an admin form before anything is sent to the gateway.
pub fn validate_product(input: &ProductInput, categories: &CategorySet) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::validation("name", "Product name is required"));
    }
    if input.price <= 0 {
        return Err(AppError::validation("price", "Price must be greater than 0"));
    }
    if !categories.contains(&input.category) {
        return Err(AppError::validation(
            "category",
            format!("Select a valid category (got {:?})", input.category),
        ));
    }
    Ok(())
}

/// Create, update and delete products. Any success invalidates every catalog cache.
///
/// Concurrent edits from different admins are last-write-wins.
pub struct CatalogMutations {
    gateway: Arc<dyn Gateway>,
    query: Arc<CatalogQuery>,
    notifier: Arc<dyn Notifier>,
    in_flight: Arc<InFlight>,
}

impl CatalogMutations {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        query: Arc<CatalogQuery>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            query,
            notifier,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, AppError> {
        let input = self.prepare(input)?;
        let result = self.gateway.insert_product(&input).await;
        self.settle(result, "Product added", "Could not add the product")
    }

    pub async fn update_product(&self, id: &str, input: ProductInput) -> Result<Product, AppError> {
        let input = self.prepare(input)?;
        let _guard = self.in_flight.acquire(id)?;
        let result = self.gateway.update_product(id, &input).await;
        self.settle(result, "Product updated", "Could not update the product")
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.in_flight.acquire(id)?;
        let result = self.gateway.delete_product(id).await;
        self.settle(result, "Product deleted", "Could not delete the product")
    }

    fn prepare(&self, mut input: ProductInput) -> Result<ProductInput, AppError> {
        validate_product(&input, self.query.available_categories())?;

        input.name = input.name.trim().to_string();
        input.description = input.description.filter(|d| !d.trim().is_empty());
        input.image_url = input.image_url.filter(|u| !u.trim().is_empty());

        if !input.promo_is_consistent() {
            tracing::warn!(
                name = %input.name,
                price = input.price,
                promo_price = ?input.promo_price,
                "Active promo price is not below the list price"
            );
        }
        Ok(input)
    }

    fn settle<T>(
        &self,
        result: Result<T, AppError>,
        success: &str,
        failure: &str,
    ) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                self.query.invalidate_all();
                self.notifier.notify(Notification::success(success));
                Ok(value)
            }
            Err(e) => {
                tracing::error!("{}: {}", failure, e);
                self.notifier
                    .notify(Notification::error(format!("{}: {}", failure, e.message())));
                Err(e)
            }
        }
    }
}
