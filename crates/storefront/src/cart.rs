//! Cart State: the authoritative cart snapshot and its mutations.
//!
//! The displayed cart count is never derived from an assumed successful
//! add; it always comes from the last successful load. After every
//! successful mutation the snapshot is re-fetched from the backend, which
//! prevents count drift when an add succeeded server-side but its
//! confirmation was lost.
//!
//! Rapid duplicate user actions are de-duplicated client-side: while an add
//! for a given item is outstanding, further adds for the same item are
//! rejected before reaching the network. The backend's 409 conflict
//! detection remains the authoritative safety net.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, info};

use bazaar_core::{CartSnapshot, ItemId};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart could not be fetched. Callers may render an empty cart for
    /// display purposes while logging the cause; browsing must not block.
    #[error("cart unavailable: {0}")]
    Unavailable(#[source] ApiError),

    /// The add request failed outright. The held snapshot is untouched.
    #[error("failed to add item to cart: {0}")]
    Add(#[source] ApiError),

    /// The add took effect server-side, but the mandatory resync failed.
    /// The local count must not be trusted until the next successful load.
    #[error("item added, but cart resync failed: {0}")]
    Resync(#[source] ApiError),
}

impl CartError {
    /// Unwrap the underlying transport error.
    #[must_use]
    pub fn into_api_error(self) -> ApiError {
        match self {
            Self::Unavailable(e) | Self::Add(e) | Self::Resync(e) => e,
        }
    }
}

/// Outcome of an add-to-cart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The backend accepted the item and the snapshot was resynchronized.
    Added,
    /// The backend reported 409: the entry already exists. Informational;
    /// the snapshot is unchanged and no retry is made.
    AlreadyInCart,
    /// An add for the same item is still outstanding; this one was
    /// coalesced away without touching the network.
    AlreadyPending,
}

/// The session's cart state.
///
/// Holds the last successfully fetched [`CartSnapshot`] plus the purely
/// local favorites set, which is never sent to the backend.
#[derive(Default)]
pub struct CartState {
    snapshot: RwLock<CartSnapshot>,
    favorites: RwLock<HashSet<ItemId>>,
    in_flight: Mutex<HashSet<ItemId>>,
}

impl CartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the user's current cart and replace the held snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Unavailable` on any failure, including the
    /// backend's 404 for a user with no active cart; the held snapshot is
    /// left untouched.
    pub async fn load(&self, api: &ApiClient) -> Result<CartSnapshot, CartError> {
        match api.fetch_user_cart().await {
            Ok(snapshot) => {
                debug!(count = snapshot.count(), "cart snapshot replaced");
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
                Ok(snapshot)
            }
            Err(err) => Err(CartError::Unavailable(err)),
        }
    }

    /// Ask the backend to add `item_id` to the cart, then resynchronize.
    ///
    /// The operation is not complete until the resync finishes or fails:
    /// a success return means the snapshot (and therefore the count badge)
    /// reflects server truth again.
    ///
    /// # Errors
    ///
    /// - `CartError::Add` - the add itself failed; snapshot untouched.
    /// - `CartError::Resync` - the add landed but the re-fetch failed.
    pub async fn add_item(
        &self,
        api: &ApiClient,
        item_id: ItemId,
    ) -> Result<AddOutcome, CartError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, item_id) else {
            debug!(%item_id, "add coalesced: request already in flight");
            return Ok(AddOutcome::AlreadyPending);
        };

        match api.add_cart_item(item_id).await {
            Ok(()) => {}
            Err(err) if err.is_conflict() => {
                info!(%item_id, "item already in cart");
                return Ok(AddOutcome::AlreadyInCart);
            }
            Err(err) => return Err(CartError::Add(err)),
        }

        // Mandatory resync: the count badge is only trusted once the
        // snapshot has been re-read from the backend.
        match self.load(api).await {
            Ok(_) => Ok(AddOutcome::Added),
            Err(err) => Err(CartError::Resync(err.into_api_error())),
        }
    }

    /// The last successfully fetched snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cart badge count, derived exclusively from the last successful load.
    #[must_use]
    pub fn count(&self) -> usize {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .count()
    }

    // =========================================================================
    // Favorites (client-only annotation, no server invariant)
    // =========================================================================

    /// Toggle an item's favorite flag. Returns whether it is now favorited.
    pub fn toggle_favorite(&self, item_id: ItemId) -> bool {
        let mut favorites = self
            .favorites
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if favorites.remove(&item_id) {
            false
        } else {
            favorites.insert(item_id);
            true
        }
    }

    #[must_use]
    pub fn is_favorite(&self, item_id: ItemId) -> bool {
        self.favorites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&item_id)
    }

    /// Reset all held state (session teardown).
    pub fn clear(&self) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = CartSnapshot::empty();
        self.favorites
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// RAII marker for an outstanding add on one item. Releases the key on
/// every exit path, including early returns and panics.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<ItemId>>,
    item_id: ItemId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<ItemId>>, item_id: ItemId) -> Option<Self> {
        let mut keys = set.lock().unwrap_or_else(PoisonError::into_inner);
        if keys.insert(item_id) {
            Some(Self { set, item_id })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.item_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_excludes_same_key() {
        let set = Mutex::new(HashSet::new());
        let id = ItemId::new(5);

        let first = InFlightGuard::acquire(&set, id);
        assert!(first.is_some());
        assert!(InFlightGuard::acquire(&set, id).is_none());

        // A different item is unaffected
        assert!(InFlightGuard::acquire(&set, ItemId::new(6)).is_some());

        drop(first);
        assert!(InFlightGuard::acquire(&set, id).is_some());
    }

    #[test]
    fn test_favorites_toggle() {
        let cart = CartState::new();
        let id = ItemId::new(1);

        assert!(!cart.is_favorite(id));
        assert!(cart.toggle_favorite(id));
        assert!(cart.is_favorite(id));
        assert!(!cart.toggle_favorite(id));
        assert!(!cart.is_favorite(id));
    }

    #[test]
    fn test_clear_resets_snapshot_and_favorites() {
        let cart = CartState::new();
        cart.toggle_favorite(ItemId::new(1));
        cart.clear();
        assert!(!cart.is_favorite(ItemId::new(1)));
        assert_eq!(cart.count(), 0);
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_count_starts_at_zero() {
        assert_eq!(CartState::new().count(), 0);
    }
}
