//! Typed REST client for the Bazaar backend.
//!
//! One method per endpoint, all JSON, all non-blocking. The bearer
//! credential is held in an explicit slot on the client and attached to
//! every outgoing request; it is installed and cleared only at the session
//! lifecycle boundary, never read from ambient storage.
//!
//! Every request carries a generated `x-request-id` header so client and
//! backend logs can be correlated.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use uuid::Uuid;

use bazaar_core::{CartSnapshot, Item, ItemId, LoginRequest, LoginResponse, Order};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Request body for `POST /carts`.
#[derive(Debug, Serialize)]
struct AddToCartRequest {
    item_id: ItemId,
}

/// Client for the Bazaar REST backend.
///
/// Cheaply cloneable via `Arc`; all clones share the same HTTP connection
/// pool and credential slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: url::Url,
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                token: RwLock::new(None),
            }),
        })
    }

    // =========================================================================
    // Credential Slot
    // =========================================================================

    /// Install the bearer token attached to subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Clear the bearer token. Subsequent requests go out unauthenticated.
    pub fn clear_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a credential is currently installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Hand the current credential to an external token store. The session
    /// itself never persists it.
    #[must_use]
    pub fn token_for_export(&self) -> Option<SecretString> {
        self.token()
    }

    fn token(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<url::Url, ApiError> {
        self.inner.base_url.join(path).map_err(|e| ApiError::Status {
            status: 0,
            message: format!("invalid endpoint path {path}: {e}"),
        })
    }

    /// Attach correlation ID and credential, send, and surface non-success
    /// statuses through the error taxonomy. Returns the raw body text.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4();
        let mut request = request.header("x-request-id", request_id.to_string());
        if let Some(token) = self.token() {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            debug!(%status, %request_id, "backend returned non-success status");
            return Err(ApiError::from_status(status, &body));
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let body = self.send(self.inner.http.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let text = self.send(self.inner.http.post(url).json(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// `POST /users/login`.
    ///
    /// Does not install the returned token; that is the session's decision.
    ///
    /// # Errors
    ///
    /// `Unauthorized` carries the backend's message (e.g. "Invalid username
    /// or password"); `Unreachable` when no response arrives.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.clone(),
        };
        self.post_json("/users/login", &request).await
    }

    /// `GET /items` - the full catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the caller decides what to do
    /// with its previously cached list.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, ApiError> {
        self.get_json("/items").await
    }

    /// `POST /carts` - add an item to the current user's cart.
    ///
    /// The success body is a human-readable message, not the created entry,
    /// so it is discarded; callers must resynchronize via
    /// [`fetch_user_cart`](Self::fetch_user_cart) for truth.
    ///
    /// # Errors
    ///
    /// `Conflict` when the item is already in the cart.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn add_cart_item(&self, item_id: ItemId) -> Result<(), ApiError> {
        let url = self.endpoint("/carts")?;
        let body = AddToCartRequest { item_id };
        self.send(self.inner.http.post(url).json(&body)).await?;
        Ok(())
    }

    /// `GET /carts/user` - the current user's authoritative cart.
    ///
    /// # Errors
    ///
    /// `NotFound` when the backend has no active cart for the user.
    #[instrument(skip(self))]
    pub async fn fetch_user_cart(&self) -> Result<CartSnapshot, ApiError> {
        self.get_json("/carts/user").await
    }

    /// `POST /orders` - convert the current cart into an order.
    ///
    /// The backend empties the cart as a side effect of order creation.
    ///
    /// # Errors
    ///
    /// `BadRequest` when the cart is empty.
    #[instrument(skip(self))]
    pub async fn create_order(&self) -> Result<Order, ApiError> {
        let url = self.endpoint("/orders")?;
        let body = self.send(self.inner.http.post(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /orders/user` - the current user's order history, in the
    /// backend's own ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; there is no retry.
    #[instrument(skip(self))]
    pub async fn list_user_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json("/orders/user").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> ApiClient {
        let config = ClientConfig::new(url::Url::parse("http://localhost:8080").unwrap());
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_token_slot_lifecycle() {
        let client = test_client();
        assert!(!client.has_token());

        client.set_token(SecretString::from("jwt-token"));
        assert!(client.has_token());

        client.clear_token();
        assert!(!client.has_token());
    }

    #[test]
    fn test_clones_share_credential_slot() {
        let client = test_client();
        let clone = client.clone();
        client.set_token(SecretString::from("jwt-token"));
        assert!(clone.has_token());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = test_client();
        let url = client.endpoint("/carts/user").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/carts/user");
    }
}
