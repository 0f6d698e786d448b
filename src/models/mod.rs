//! Data models for the storefront.
//!
//! Serialized in camelCase to match the storefront's TypeScript interfaces.

mod auth;
mod cart;
mod catalog;
mod oembed;
mod product;
mod settings;

pub use auth::*;
pub use cart::*;
pub use catalog::*;
pub use oembed::*;
pub use product::*;
pub use settings::*;
