//! Shopping cart aggregate and the service that persists it per visitor.

mod store;

pub use store::*;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::CatalogQuery;
use crate::checkout::{cart_link, format_price, require_number};
use crate::errors::AppError;
use crate::models::{CartItem, CartView, CheckoutLink, Product, MAX_LINE_QUANTITY};
use crate::settings::SettingsService;

/// Ordered line items, at most one per product id, every quantity in `1..=MAX_LINE_QUANTITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Rebuild from persisted items, merging duplicates and dropping zero quantities.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::default();
        for mut item in items.into_iter().filter(|i| i.quantity > 0) {
            match cart.items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(item.quantity)
                        .min(MAX_LINE_QUANTITY)
                }
                None => {
                    item.quantity = item.quantity.min(MAX_LINE_QUANTITY);
                    cart.items.push(item)
                }
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit. An existing line is incremented up to the line limit; its snapshot is kept.
    pub fn add(&mut self, product: &Product) {
        match self.items.iter_mut().find(|i| i.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1).min(MAX_LINE_QUANTITY),
            None => self.items.push(CartItem::from_product(product)),
        }
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != product_id);
        self.items.len() != before
    }

    /// Set a line quantity. Quantities below 1 and unknown ids are ignored; larger
    /// ones are clamped to the line limit.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity < 1 {
            return false;
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(MAX_LINE_QUANTITY);
        match self.items.iter_mut().find(|i| i.id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of effective unit prices times quantities, saturating at the `i64` bounds.
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(0i64, i64::saturating_add)
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }

    pub fn view(&self, currency: &str) -> CartView {
        let total = self.total();
        CartView {
            items: self.items.clone(),
            item_count: self.item_count(),
            total,
            formatted_total: format_price(total, currency),
        }
    }
}

/// Cart operations keyed by client-chosen cart id.
///
/// Line items are snapshots: later product edits or deletions do not touch them.
pub struct CartService {
    store: FileCartStore,
    catalog: Arc<CatalogQuery>,
    settings: Arc<SettingsService>,
    currency: String,
    // Serializes read-modify-write cycles on cart documents
    lock: Mutex<()>,
}

impl CartService {
    pub fn new(
        store: FileCartStore,
        catalog: Arc<CatalogQuery>,
        settings: Arc<SettingsService>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            settings,
            currency: currency.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn get(&self, cart_id: &str) -> Result<CartView, AppError> {
        validate_cart_id(cart_id)?;
        Ok(self.store.load(cart_id).await?.view(&self.currency))
    }

    pub async fn add(&self, cart_id: &str, product_id: &str) -> Result<CartView, AppError> {
        validate_cart_id(cart_id)?;
        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

        self.modify(cart_id, |cart| {
            cart.add(&product);
            true
        })
        .await
    }

    pub async fn set_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<CartView, AppError> {
        validate_cart_id(cart_id)?;
        self.modify(cart_id, |cart| cart.set_quantity(product_id, quantity))
            .await
    }

    pub async fn remove(&self, cart_id: &str, product_id: &str) -> Result<CartView, AppError> {
        validate_cart_id(cart_id)?;
        self.modify(cart_id, |cart| cart.remove(product_id)).await
    }

    pub async fn clear(&self, cart_id: &str) -> Result<CartView, AppError> {
        validate_cart_id(cart_id)?;
        let _lock = self.lock.lock().await;
        self.store.remove(cart_id).await?;
        Ok(Cart::default().view(&self.currency))
    }

    /// Build the WhatsApp order link and empty the cart.
    pub async fn checkout(&self, cart_id: &str) -> Result<CheckoutLink, AppError> {
        validate_cart_id(cart_id)?;
        let _lock = self.lock.lock().await;

        let cart = self.store.load(cart_id).await?;
        if cart.is_empty() {
            return Err(AppError::validation("cart", "Cart is empty"));
        }

        let settings = self.settings.get_settings().await?;
        let number = require_number(settings.as_ref())?;
        let shop_name = self.settings.render(settings.as_ref()).shop_name;

        let total = cart.total();
        let url = cart_link(&number, &shop_name, cart.items(), total, &self.currency);
        self.store.remove(cart_id).await?;
        tracing::info!(cart_id, total, "Checkout link issued");

        Ok(CheckoutLink { url, total })
    }

    async fn modify<F>(&self, cart_id: &str, change: F) -> Result<CartView, AppError>
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let _lock = self.lock.lock().await;
        let mut cart = self.store.load(cart_id).await?;
        if change(&mut cart) {
            if cart.is_empty() {
                self.store.remove(cart_id).await?;
            } else {
                self.store.save(cart_id, &cart).await?;
            }
        }
        Ok(cart.view(&self.currency))
    }
}
