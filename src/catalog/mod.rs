//! Product catalog: cached queries, validated mutations and page-local filters.
//!
//! Category and pagination are resolved by the gateway. Search and promotion filters
//! run over the page already fetched, never over the whole catalog.

mod filter;
mod mutation;
mod query;

pub use filter::*;
pub use mutation::*;
pub use query::*;

use std::sync::Arc;

/// The tenant's enumerated category labels.
#[derive(Debug, Clone)]
pub struct CategorySet(Arc<Vec<String>>);

impl CategorySet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(labels.into_iter().map(Into::into).collect()))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|c| c == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }
}
