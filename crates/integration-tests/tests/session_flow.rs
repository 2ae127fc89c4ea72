//! Session lifecycle: login, startup population, connectivity failures.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bazaar_integration_tests::{TEST_PASSWORD, TEST_USER, TestBackend, authed_session};
use bazaar_storefront::config::ClientConfig;
use bazaar_storefront::session::{Session, SessionError};
use secrecy::SecretString;

#[tokio::test]
async fn login_installs_token_and_start_populates_both_submodels() {
    let backend = TestBackend::start().await;
    backend.seed_item("Laptop Pro", "active");
    backend.seed_item("Phone X", "inactive");

    let (_, session) = authed_session(&backend).await;
    assert!(session.api().has_token());

    let report = session.start().await;
    assert!(report.catalog_error.is_none());
    assert!(report.cart_available);
    assert_eq!(session.catalog().len(), 2);
    assert_eq!(session.cart().count(), 0);
}

#[tokio::test]
async fn login_failure_surfaces_backend_message() {
    let backend = TestBackend::start().await;
    backend.seed_user(TEST_USER, TEST_PASSWORD);

    let session = Session::new(ClientConfig::new(backend.url())).unwrap();
    let err = session
        .login(TEST_USER, &SecretString::from("wrong-password"))
        .await
        .unwrap_err();

    match err {
        SessionError::Login(api_err) => {
            assert_eq!(
                api_err.to_string(),
                "unauthorized: Invalid username or password"
            );
        }
        other => panic!("expected login error, got {other:?}"),
    }
    assert!(!session.api().has_token());
}

#[tokio::test]
async fn unreachable_backend_is_distinguished_from_server_errors() {
    // Bind an ephemeral port, then drop the listener so nothing answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let url = url::Url::parse(&format!("http://{dead_addr}")).unwrap();
    let session = Session::new(ClientConfig::new(url)).unwrap();

    let err = session
        .login("alice", &SecretString::from("irrelevant"))
        .await
        .unwrap_err();
    match err {
        SessionError::Login(api_err) => {
            assert!(api_err.is_unreachable());
            assert!(api_err.to_string().contains("Check that the backend is running"));
        }
        other => panic!("expected unreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn cart_failure_does_not_block_catalog_browsing() {
    let backend = TestBackend::start().await;
    backend.seed_item("Laptop Pro", "active");

    // No login: /carts/user answers 401, but /items is public.
    let session = Session::new(ClientConfig::new(backend.url())).unwrap();
    let report = session.start().await;

    assert!(report.catalog_error.is_none());
    assert!(!report.cart_available);
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.cart().count(), 0);
}

#[tokio::test]
async fn logout_tears_down_session_state() {
    let backend = TestBackend::start().await;
    backend.seed_item("Laptop Pro", "active");

    let (_, session) = authed_session(&backend).await;
    session.start().await;
    assert!(!session.catalog().is_empty());

    session.logout();
    assert!(!session.api().has_token());
    assert!(session.catalog().is_empty());
    assert_eq!(session.cart().count(), 0);
}

#[tokio::test]
async fn cancelled_view_scope_discards_late_results() {
    let backend = TestBackend::start().await;
    backend.seed_item("Laptop Pro", "active");
    let (_, session) = authed_session(&backend).await;

    let scope = session.view_scope();
    scope.cancel();

    // The refresh future is discarded, so the cache stays untouched.
    let result = scope.run(session.refresh_catalog()).await;
    assert!(result.is_none());
    assert!(session.catalog().is_empty());
}

#[tokio::test]
async fn attach_token_authorizes_requests_without_login() {
    let backend = TestBackend::start().await;
    let (_, first) = authed_session(&backend).await;
    let token = first.api().token_for_export().expect("token after login");

    // A second process reuses the stored credential.
    let second = Session::new(ClientConfig::new(backend.url())).unwrap();
    second.attach_token(token);
    let snapshot = second.cart().load(second.api()).await.expect("cart loads");
    assert!(snapshot.is_empty());
}
