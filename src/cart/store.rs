//! File-backed cart persistence.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::models::{PersistedCart, CART_SCHEMA_VERSION};

use super::Cart;

/// Storage namespace of persisted carts.
pub const CART_NAMESPACE: &str = "storefront-cart";

const MAX_CART_ID_LEN: usize = 64;

/// Cart ids are client-chosen: 1-64 characters of `[A-Za-z0-9_-]`.
pub fn validate_cart_id(cart_id: &str) -> Result<(), AppError> {
    let valid = !cart_id.is_empty()
        && cart_id.len() <= MAX_CART_ID_LEN
        && cart_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(AppError::validation(
            "cartId",
            "Cart id must be 1-64 characters of letters, digits, '_' or '-'",
        ));
    }
    Ok(())
}

/// One JSON document per cart, `{namespace}.{cart_id}.json`.
pub struct FileCartStore {
    dir: PathBuf,
    namespace: String,
}

impl FileCartStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            namespace: CART_NAMESPACE.to_string(),
        }
    }

    fn path(&self, cart_id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.json", self.namespace, cart_id))
    }

    /// Load a cart. Missing, unreadable or foreign-version documents yield an empty cart.
    pub async fn load(&self, cart_id: &str) -> Result<Cart, AppError> {
        let path = self.path(cart_id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Cart::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<PersistedCart>(&raw) {
            Ok(persisted) if persisted.version == CART_SCHEMA_VERSION => {
                Ok(Cart::from_items(persisted.items))
            }
            Ok(persisted) => {
                tracing::warn!(
                    cart_id,
                    version = persisted.version,
                    "Discarding cart with unknown schema version"
                );
                Ok(Cart::default())
            }
            Err(e) => {
                tracing::warn!(cart_id, "Discarding unreadable cart: {}", e);
                Ok(Cart::default())
            }
        }
    }

    /// Persist a cart, replacing the previous document atomically.
    pub async fn save(&self, cart_id: &str, cart: &Cart) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let document = PersistedCart {
            version: CART_SCHEMA_VERSION,
            items: cart.items().to_vec(),
        };
        let body = serde_json::to_vec(&document)?;

        let path = self.path(cart_id);
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    pub async fn remove(&self, cart_id: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(self.path(cart_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
