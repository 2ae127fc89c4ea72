//! Catalog item types.
//!
//! Items are owned and versioned by the backend. The client only ever holds
//! a read-only cached copy, refreshed wholesale on catalog fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ItemId;

/// Lifecycle status of a catalog item.
///
/// The backend may grow new statuses without a coordinated client release,
/// so unrecognized values deserialize to [`ItemStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    /// Whether the item is currently purchasable.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A purchasable catalog item, as returned by `GET /items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub status: ItemStatus,
    /// Relative path under the backend's static-asset origin.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
