//! Order History: a pure read of the user's past orders.
//!
//! Orders are immutable once created. The backend's returned ordering
//! (reverse-chronological by convention) is preserved; the client does not
//! re-sort and does not retry on failure.

use thiserror::Error;

use bazaar_core::Order;

use crate::api::ApiClient;
use crate::error::ApiError;

/// Errors surfaced when listing order history.
#[derive(Debug, Error)]
pub enum OrderHistoryError {
    #[error("order history unavailable: {0}")]
    Unavailable(#[source] ApiError),
}

/// List the current user's orders in the backend's ordering.
///
/// # Errors
///
/// Returns `OrderHistoryError::Unavailable` on any failure; there is no
/// display invariant beyond showing the list, so the caller surfaces a
/// generic "history unavailable" message.
pub async fn list_orders(api: &ApiClient) -> Result<Vec<Order>, OrderHistoryError> {
    api.list_user_orders()
        .await
        .map_err(OrderHistoryError::Unavailable)
}
