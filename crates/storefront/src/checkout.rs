//! Checkout Flow: converting the cart into an order.
//!
//! A short-lived state machine: `Idle -> Checking -> Idle` on every path.
//! No intermediate state is persisted client-side; a reload mid-checkout
//! simply re-derives truth from the backend on the next load. The client
//! does not pre-check cart emptiness - that precondition belongs to the
//! backend, which signals it with 400.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{info, warn};

use bazaar_core::Order;

use crate::api::ApiClient;
use crate::cart::CartState;
use crate::error::ApiError;

/// Errors surfaced by checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Backend reported the empty-cart precondition failure (400).
    /// Surfaced distinctly so the user sees "cart is empty", not a generic
    /// error. The cart is unchanged.
    #[error("cart is empty")]
    EmptyCart,

    /// A checkout is already in flight; this one was rejected client-side.
    #[error("a checkout is already in progress")]
    InProgress,

    /// Generic failure. The cart state is not assumed changed and is not
    /// resynchronized speculatively.
    #[error("failed to create order: {0}")]
    Failed(#[source] ApiError),

    /// The order was created but the post-success cart resync failed; the
    /// local snapshot is stale until the next successful load.
    #[error("order created, but cart resync failed: {0}")]
    Resync(#[source] ApiError),
}

/// Observable state of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Checking,
}

/// The session's checkout flow. At most one checkout runs at a time.
#[derive(Default)]
pub struct CheckoutFlow {
    state: Mutex<CheckoutState>,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> CheckoutState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an order from the current cart.
    ///
    /// On success the backend has emptied the cart as a side effect of
    /// order creation; the cart state is resynchronized before returning so
    /// the UI's cart view transitions to empty.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]. On `EmptyCart` and `Failed` the cart snapshot
    /// is exactly what it was before the call.
    pub async fn checkout(
        &self,
        api: &ApiClient,
        cart: &CartState,
    ) -> Result<Order, CheckoutError> {
        let Some(_guard) = FlowGuard::enter(&self.state) else {
            return Err(CheckoutError::InProgress);
        };

        let order = match api.create_order().await {
            Ok(order) => order,
            Err(err) if err.is_bad_request() => return Err(CheckoutError::EmptyCart),
            Err(err) => return Err(CheckoutError::Failed(err)),
        };

        info!(order_id = %order.id, "order created");

        // The backend cleared the cart; re-fetch so the snapshot agrees.
        match cart.load(api).await {
            Ok(_) => Ok(order),
            Err(err) => {
                warn!(order_id = %order.id, "post-checkout cart resync failed");
                Err(CheckoutError::Resync(err.into_api_error()))
            }
        }
    }
}

/// RAII transition `Idle -> Checking`, reverting on drop.
struct FlowGuard<'a> {
    state: &'a Mutex<CheckoutState>,
}

impl<'a> FlowGuard<'a> {
    fn enter(state: &'a Mutex<CheckoutState>) -> Option<Self> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == CheckoutState::Checking {
            return None;
        }
        *current = CheckoutState::Checking;
        Some(Self { state })
    }
}

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = CheckoutState::Idle;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_starts_idle() {
        assert_eq!(CheckoutFlow::new().state(), CheckoutState::Idle);
    }

    #[test]
    fn test_flow_guard_is_exclusive_and_reverts() {
        let flow = CheckoutFlow::new();

        let guard = FlowGuard::enter(&flow.state);
        assert!(guard.is_some());
        assert_eq!(flow.state(), CheckoutState::Checking);
        assert!(FlowGuard::enter(&flow.state).is_none());

        drop(guard);
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(FlowGuard::enter(&flow.state).is_some());
    }
}
