//! The Storefront Session: composition root for the sub-models.
//!
//! One session per authenticated user, owning the catalog cache, cart
//! state, and checkout flow exclusively. All state dies with the session;
//! nothing persists across restarts except the credential, which an
//! external collaborator stores and hands back via
//! [`Session::attach_token`].

use secrecy::SecretString;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bazaar_core::{Item, ItemId, Order, User};

use crate::api::ApiClient;
use crate::cart::{AddOutcome, CartError, CartState};
use crate::catalog::{CatalogCache, CatalogError, filter_items};
use crate::checkout::{CheckoutError, CheckoutFlow, CheckoutState};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::images::ItemImage;
use crate::orders::{OrderHistoryError, list_orders};

/// Errors surfaced by session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login failed: {0}")]
    Login(#[source] ApiError),
}

/// Result of populating the session on start.
///
/// Catalog and cart load independently: a cart failure must not block
/// catalog browsing, so it is reported here instead of failing the call.
#[derive(Debug)]
pub struct StartReport {
    /// Set when the catalog fetch failed; the (possibly empty) prior cache
    /// is still in place and should be rendered with an error indicator.
    pub catalog_error: Option<CatalogError>,
    /// False when the cart fetch failed; the cart renders as empty and the
    /// cause has been logged.
    pub cart_available: bool,
}

/// A user's storefront session.
pub struct Session {
    api: ApiClient,
    catalog: CatalogCache,
    cart: CartState,
    checkout: CheckoutFlow,
    config: ClientConfig,
}

impl Session {
    /// Create a session against the configured backend. No network traffic
    /// happens until login or start.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, SessionError> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            api,
            catalog: CatalogCache::new(),
            cart: CartState::new(),
            checkout: CheckoutFlow::new(),
            config,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Authenticate and install the returned bearer token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Login` carrying the backend's message.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<User, SessionError> {
        let response = self
            .api
            .login(username, password)
            .await
            .map_err(SessionError::Login)?;
        self.api.set_token(SecretString::from(response.token));
        info!(user_id = %response.user.id, "logged in");
        Ok(response.user)
    }

    /// Install an externally stored credential (the token store is an
    /// external collaborator; the session only injects it at this boundary).
    pub fn attach_token(&self, token: SecretString) {
        self.api.set_token(token);
    }

    /// Clear the credential and all session-owned state.
    pub fn logout(&self) {
        self.api.clear_token();
        self.catalog.clear();
        self.cart.clear();
        info!("logged out, session state cleared");
    }

    /// Populate catalog and cart concurrently and independently.
    ///
    /// Neither failure aborts the other pipeline; both degrade to a visible
    /// condition in the returned report with prior state preserved.
    pub async fn start(&self) -> StartReport {
        let (catalog, cart) = tokio::join!(
            self.catalog.refresh(&self.api),
            self.cart.load(&self.api),
        );

        let cart_available = match cart {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "cart fetch failed, rendering as empty");
                false
            }
        };

        StartReport {
            catalog_error: catalog.err(),
            cart_available,
        }
    }

    // =========================================================================
    // Sub-model access & convenience operations
    // =========================================================================

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Re-fetch the catalog, replacing the cache wholesale.
    ///
    /// # Errors
    ///
    /// See [`CatalogCache::refresh`].
    pub async fn refresh_catalog(&self) -> Result<Vec<Item>, CatalogError> {
        self.catalog.refresh(&self.api).await
    }

    /// The cached catalog filtered by search term and category. Pure view
    /// derivation, recomputed on every call.
    #[must_use]
    pub fn filtered_items(&self, search: &str, category: &str) -> Vec<Item> {
        filter_items(&self.catalog.items(), search, category)
    }

    /// Add an item to the cart and resynchronize. See [`CartState::add_item`].
    ///
    /// # Errors
    ///
    /// See [`CartError`].
    pub async fn add_to_cart(&self, item_id: ItemId) -> Result<AddOutcome, CartError> {
        self.cart.add_item(&self.api, item_id).await
    }

    /// Check out the current cart. See [`CheckoutFlow::checkout`].
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`].
    pub async fn checkout(&self) -> Result<Order, CheckoutError> {
        self.checkout.checkout(&self.api, &self.cart).await
    }

    /// Observable state of the checkout flow, for disabling the checkout
    /// control while one is running.
    #[must_use]
    pub fn checkout_state(&self) -> CheckoutState {
        self.checkout.state()
    }

    /// List the user's order history in the backend's ordering.
    ///
    /// # Errors
    ///
    /// See [`OrderHistoryError`].
    pub async fn order_history(&self) -> Result<Vec<Order>, OrderHistoryError> {
        list_orders(&self.api).await
    }

    /// Resolve an item's display image against the configured asset origin.
    #[must_use]
    pub fn item_image(&self, item: &Item) -> ItemImage {
        ItemImage::new(&self.config.asset_base_url, item)
    }

    /// Open a cancellation scope tied to a consuming view's lifetime.
    #[must_use]
    pub fn view_scope(&self) -> ViewScope {
        ViewScope::new()
    }
}

// =============================================================================
// View-scoped cancellation
// =============================================================================

/// Ties in-flight operations to a view's lifetime.
///
/// A background operation whose target view no longer exists must not
/// mutate state: run session operations through [`ViewScope::run`] and a
/// cancelled scope resolves them to `None`, discarding the late result
/// instead of applying it. Dropping the scope cancels it.
#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Run an operation under this scope. Returns `None` if the scope was
    /// cancelled before the operation finished.
    pub async fn run<F>(&self, operation: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            () = self.token.cancelled() => None,
            output = operation => Some(output),
        }
    }

    /// Cancel the scope; operations currently under [`run`](Self::run)
    /// resolve to `None`.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn test_session() -> Session {
        let config = ClientConfig::new(Url::parse("http://localhost:8080").unwrap());
        Session::new(config).unwrap()
    }

    #[test]
    fn test_attach_and_logout_manage_token() {
        let session = test_session();
        assert!(!session.api().has_token());

        session.attach_token(SecretString::from("stored-token"));
        assert!(session.api().has_token());

        session.logout();
        assert!(!session.api().has_token());
    }

    #[test]
    fn test_logout_clears_owned_state() {
        let session = test_session();
        session.cart().toggle_favorite(ItemId::new(1));
        session.logout();
        assert!(!session.cart().is_favorite(ItemId::new(1)));
        assert!(session.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_view_scope_passes_results_through() {
        let session = test_session();
        let scope = session.view_scope();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_cancelled_scope_discards_late_results() {
        let session = test_session();
        let scope = session.view_scope();
        scope.cancel();
        assert!(scope.is_cancelled());

        let result = scope.run(std::future::pending::<()>()).await;
        assert!(result.is_none());
    }
}
