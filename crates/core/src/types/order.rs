//! Order types.
//!
//! Orders are created only by checkout and are immutable once created; the
//! client lists them and never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CartId, OrderId, UserId};

/// Processing status of an order. Tolerant of statuses introduced
/// backend-side after this client shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Created,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// An immutable order, as returned by `POST /orders` and `GET /orders/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}
