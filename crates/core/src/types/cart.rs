//! Cart types.
//!
//! The backend holds the authoritative cart. A [`CartSnapshot`] is the
//! client's last-fetched copy of it: replaced wholesale after every
//! successful mutation, never patched optimistically.

use serde::{Deserialize, Serialize};

use super::id::{CartId, ItemId};
use super::item::Item;

/// Status of a backend cart. Carts transition from `active` to `ordered`
/// when checkout converts them into an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    #[default]
    Active,
    Ordered,
    #[serde(other)]
    Unknown,
}

/// A single cart line, as embedded in `GET /carts/user`.
///
/// The backend guarantees at most one entry per (user, item) pair and
/// signals violations with 409 Conflict; the client treats a conflict as
/// "entry already present", never as grounds for a retry-as-new.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub cart_id: CartId,
    pub item_id: ItemId,
    /// Item snapshot embedded by the backend at fetch time.
    pub item: Item,
}

/// The authoritative cart as fetched from `GET /carts/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CartSnapshot {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub status: CartStatus,
    #[serde(rename = "cart_items", default)]
    pub entries: Vec<CartEntry>,
}

impl CartSnapshot {
    /// An empty snapshot, used before the first successful fetch and when
    /// the backend reports no cart for the user.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries; this is the only legitimate source for the cart
    /// count badge.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the snapshot already holds an entry for `item_id`.
    #[must_use]
    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.entries.iter().any(|e| e.item_id == item_id)
    }
}
