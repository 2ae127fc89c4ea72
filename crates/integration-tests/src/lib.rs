//! Integration test support for Bazaar.
//!
//! Provides [`TestBackend`], an in-process stub of the Bazaar REST backend
//! with the same observable contract the session client depends on:
//!
//! - bearer-token auth on cart and order endpoints
//! - 409 for an item already in the cart (one entry per cart+item key)
//! - 400 for checkout on an empty cart
//! - order creation empties the active cart and provisions a fresh one
//! - a read-failure toggle for exercising degraded paths
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

// Test support crate: panicking on malformed test setup is acceptable.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

#[derive(Debug)]
struct UserRecord {
    id: i64,
    username: String,
    password: String,
    cart_id: i64,
}

#[derive(Default)]
struct BackendState {
    users: Vec<UserRecord>,
    /// Item objects in wire shape.
    items: Vec<Value>,
    /// (cart_id, item_id) -> embedded item snapshot. The composite key is
    /// what makes duplicate adds observable as 409.
    cart_items: BTreeMap<(i64, i64), Value>,
    orders: Vec<Value>,
    tokens: HashMap<String, i64>,
    next_id: i64,
    /// When set, GET endpoints answer 500 to simulate a degraded backend.
    fail_reads: bool,
    /// Artificial latency for POST /carts, for concurrency tests.
    add_delay: Option<Duration>,
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_by_token(&self, token: &str) -> Option<&UserRecord> {
        let user_id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *user_id)
    }

    fn cart_entries(&self, cart_id: i64) -> Vec<Value> {
        self.cart_items
            .iter()
            .filter(|((cid, _), _)| *cid == cart_id)
            .map(|((cid, iid), item)| {
                json!({"cart_id": cid, "item_id": iid, "item": item})
            })
            .collect()
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// In-process stub backend bound to an ephemeral localhost port.
pub struct TestBackend {
    addr: SocketAddr,
    state: Shared,
}

impl TestBackend {
    /// Bind and start serving. The server task lives until the runtime
    /// shuts down, which for `#[tokio::test]` is the end of the test.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));

        let app = Router::new()
            .route("/users/login", post(login))
            .route("/items", get(list_items))
            .route("/carts", post(add_to_cart))
            .route("/carts/user", get(user_cart))
            .route("/orders", post(create_order))
            .route("/orders/user", get(user_orders))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub backend");
        });

        Self { addr, state }
    }

    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("stub backend url")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a user with an active cart. Returns the user id.
    pub fn seed_user(&self, username: &str, password: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        let cart_id = state.next_id();
        state.users.push(UserRecord {
            id,
            username: username.to_string(),
            password: password.to_string(),
            cart_id,
        });
        id
    }

    /// Add a catalog item. Returns the item id.
    pub fn seed_item(&self, name: &str, status: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.items.push(json!({
            "id": id,
            "name": name,
            "status": status,
            "image": format!("/assets/{id}.png"),
        }));
        id
    }

    /// Toggle 500s on all GET endpoints.
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Delay POST /carts responses, so two rapid adds overlap.
    pub fn set_add_delay(&self, delay: Duration) {
        self.lock().add_delay = Some(delay);
    }

    /// Number of entries in the user's active cart, from the backend's own
    /// records (not the client's snapshot).
    #[must_use]
    pub fn cart_len(&self, user_id: i64) -> usize {
        let state = self.lock();
        let cart_id = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.cart_id)
            .expect("seeded user");
        state.cart_entries(cart_id).len()
    }

    /// Number of orders recorded for the user.
    #[must_use]
    pub fn orders_len(&self, user_id: i64) -> usize {
        self.lock()
            .orders
            .iter()
            .filter(|o| o["user_id"] == json!(user_id))
            .count()
    }
}

// =============================================================================
// Test Session Helpers
// =============================================================================

pub const TEST_USER: &str = "alice";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Seed the standard test user and return an authenticated session plus the
/// backend-side user id.
pub async fn authed_session(backend: &TestBackend) -> (i64, bazaar_storefront::Session) {
    use bazaar_storefront::config::ClientConfig;
    use bazaar_storefront::session::Session;
    use secrecy::SecretString;

    let user_id = backend.seed_user(TEST_USER, TEST_PASSWORD);
    let session = Session::new(ClientConfig::new(backend.url())).expect("build session");
    session
        .login(TEST_USER, &SecretString::from(TEST_PASSWORD))
        .await
        .expect("login seeded user");
    (user_id, session)
}

// =============================================================================
// Handlers
// =============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "User not authenticated"})),
    )
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "internal error"})),
    )
}

async fn login(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let Some(user) = state
        .users
        .iter()
        .find(|u| u.username == username && u.password == password)
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password"})),
        );
    };

    let response = json!({
        "token": format!("token-{}", Uuid::new_v4()),
        "user": {"id": user.id, "username": user.username, "cart_id": user.cart_id},
    });
    let user_id = user.id;
    let token = response["token"].as_str().unwrap_or_default().to_string();
    state.tokens.insert(token, user_id);

    (StatusCode::OK, Json(response))
}

async fn list_items(State(state): State<Shared>) -> (StatusCode, Json<Value>) {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.fail_reads {
        return internal_error();
    }
    (StatusCode::OK, Json(Value::Array(state.items.clone())))
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let delay = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .add_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let Some(cart_id) = state.user_by_token(&token).map(|u| u.cart_id) else {
        return unauthorized();
    };

    let Some(item_id) = body["item_id"].as_i64() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "item_id is required"})),
        );
    };

    let Some(item) = state.items.iter().find(|i| i["id"] == json!(item_id)).cloned() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Item not found"})),
        );
    };

    if state.cart_items.contains_key(&(cart_id, item_id)) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "Item already in cart"})),
        );
    }

    state.cart_items.insert((cart_id, item_id), item);
    (
        StatusCode::CREATED,
        Json(json!({"message": "Item added to cart successfully"})),
    )
}

async fn user_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.fail_reads {
        return internal_error();
    }

    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let Some(user) = state.user_by_token(&token) else {
        return unauthorized();
    };

    let cart = json!({
        "id": user.cart_id,
        "user_id": user.id,
        "name": "Default Cart",
        "status": "active",
        "cart_items": state.cart_entries(user.cart_id),
    });
    (StatusCode::OK, Json(cart))
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let Some((user_id, cart_id)) = state.user_by_token(&token).map(|u| (u.id, u.cart_id)) else {
        return unauthorized();
    };

    if state.cart_entries(cart_id).is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Cart is empty"})),
        );
    }

    let order_id = state.next_id();
    let order = json!({
        "id": order_id,
        "cart_id": cart_id,
        "user_id": user_id,
        "status": "created",
        "created_at": chrono::Utc::now().to_rfc3339(),
    });
    state.orders.push(order.clone());

    // Order creation consumes the cart: drop its entries and provision a
    // fresh active cart for the user.
    state.cart_items.retain(|(cid, _), _| *cid != cart_id);
    let new_cart_id = state.next_id();
    if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
        user.cart_id = new_cart_id;
    }

    (StatusCode::CREATED, Json(order))
}

async fn user_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.fail_reads {
        return internal_error();
    }

    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let Some(user_id) = state.user_by_token(&token).map(|u| u.id) else {
        return unauthorized();
    };

    // Newest first, matching the production backend's ordering convention.
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o["user_id"] == json!(user_id))
        .rev()
        .cloned()
        .collect();
    (StatusCode::OK, Json(Value::Array(orders)))
}
