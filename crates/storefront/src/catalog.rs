//! Catalog Cache: the client's read-only copy of the item list.
//!
//! The cache is replaced wholesale on every successful refresh and left
//! untouched (stale-but-valid) when a refresh fails, so a transient backend
//! outage never blanks an already-rendered catalog. Filtering is a pure
//! function over the cached list, safe to run on every keystroke.

use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

use bazaar_core::Item;

use crate::api::ApiClient;
use crate::error::ApiError;

/// Category tokens offered by the storefront. "all" disables category
/// filtering; the rest match as substrings of the item name.
pub const CATEGORIES: [&str; 9] = [
    "all",
    "laptop",
    "phone",
    "headphones",
    "keyboard",
    "mouse",
    "monitor",
    "tablet",
    "webcam",
];

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backend call failed; the prior cache is retained.
    #[error("failed to fetch items: {0}")]
    Unavailable(#[source] ApiError),
}

/// Cached catalog, exclusively owned by the active session.
#[derive(Default)]
pub struct CatalogCache {
    items: RwLock<Vec<Item>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full item list and replace the cache wholesale.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` on any backend failure. The
    /// cache keeps its prior value and no retry is attempted; the error is
    /// for user notification.
    pub async fn refresh(&self, api: &ApiClient) -> Result<Vec<Item>, CatalogError> {
        match api.list_items().await {
            Ok(items) => {
                debug!(count = items.len(), "catalog refreshed");
                *self
                    .items
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = items.clone();
                Ok(items)
            }
            Err(err) => {
                warn!(error = %err, "catalog refresh failed, keeping stale cache");
                Err(CatalogError::Unavailable(err))
            }
        }
    }

    /// The current cached list. Empty before the first successful refresh.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the cached list (session teardown).
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Filter a list of items by search term and category.
///
/// Case-insensitive substring match on the item name AND (category is
/// "all" OR the name contains the category token). Pure and deterministic:
/// no side effects, no allocation beyond the result.
#[must_use]
pub fn filter_items(items: &[Item], search: &str, category: &str) -> Vec<Item> {
    let search = search.to_lowercase();
    let category = category.to_lowercase();
    items
        .iter()
        .filter(|item| {
            let name = item.name.to_lowercase();
            let matches_search = name.contains(&search);
            let matches_category = category == "all" || name.contains(&category);
            matches_search && matches_category
        })
        .cloned()
        .collect()
}
