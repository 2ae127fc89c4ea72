//! Cart mutations against the stub backend: resync discipline, duplicate
//! handling, and request coalescing.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use bazaar_core::ItemId;
use bazaar_integration_tests::{TestBackend, authed_session};
use bazaar_storefront::cart::{AddOutcome, CartError};

#[tokio::test]
async fn add_then_duplicate_keeps_count_at_one() {
    let backend = TestBackend::start().await;
    let item_id = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let (user_id, session) = authed_session(&backend).await;

    let first = session.add_to_cart(item_id).await.unwrap();
    assert_eq!(first, AddOutcome::Added);
    assert_eq!(session.cart().count(), 1);

    // The 409 is informational; nothing changes client- or server-side.
    let second = session.add_to_cart(item_id).await.unwrap();
    assert_eq!(second, AddOutcome::AlreadyInCart);
    assert_eq!(session.cart().count(), 1);
    assert_eq!(backend.cart_len(user_id), 1);
}

#[tokio::test]
async fn add_unknown_item_fails_without_touching_snapshot() {
    let backend = TestBackend::start().await;
    let known = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let (_, session) = authed_session(&backend).await;
    session.add_to_cart(known).await.unwrap();

    let err = session.add_to_cart(ItemId::new(9999)).await.unwrap_err();
    match err {
        CartError::Add(api_err) => assert!(api_err.is_not_found()),
        other => panic!("expected add failure, got {other:?}"),
    }
    assert_eq!(session.cart().count(), 1);
}

#[tokio::test]
async fn overlapping_adds_for_one_item_are_coalesced() {
    let backend = TestBackend::start().await;
    let item_id = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let (user_id, session) = authed_session(&backend).await;

    // Hold the first add open long enough for the second to observe it.
    backend.set_add_delay(Duration::from_millis(200));

    let (first, second) = tokio::join!(
        session.add_to_cart(item_id),
        session.add_to_cart(item_id),
    );

    assert_eq!(first.unwrap(), AddOutcome::Added);
    assert_eq!(second.unwrap(), AddOutcome::AlreadyPending);
    assert_eq!(backend.cart_len(user_id), 1);
    assert_eq!(session.cart().count(), 1);
}

#[tokio::test]
async fn coalescing_is_per_item() {
    let backend = TestBackend::start().await;
    let laptop = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let phone = ItemId::new(backend.seed_item("Phone X", "active"));
    let (user_id, session) = authed_session(&backend).await;

    backend.set_add_delay(Duration::from_millis(100));

    let (first, second) = tokio::join!(
        session.add_to_cart(laptop),
        session.add_to_cart(phone),
    );

    assert_eq!(first.unwrap(), AddOutcome::Added);
    assert_eq!(second.unwrap(), AddOutcome::Added);
    assert_eq!(backend.cart_len(user_id), 2);
    assert_eq!(session.cart().count(), 2);
}

#[tokio::test]
async fn load_failure_leaves_prior_snapshot_in_place() {
    let backend = TestBackend::start().await;
    let item_id = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let (_, session) = authed_session(&backend).await;
    session.add_to_cart(item_id).await.unwrap();

    backend.set_fail_reads(true);
    let err = session.cart().load(session.api()).await.unwrap_err();
    assert!(matches!(err, CartError::Unavailable(_)));

    // The count badge still reflects the last successful load.
    assert_eq!(session.cart().count(), 1);
}

#[tokio::test]
async fn resync_failure_after_landed_add_is_its_own_error() {
    let backend = TestBackend::start().await;
    let item_id = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let (user_id, session) = authed_session(&backend).await;

    // POSTs still succeed; only the re-fetch fails.
    backend.set_fail_reads(true);
    let err = session.add_to_cart(item_id).await.unwrap_err();
    assert!(matches!(err, CartError::Resync(_)));

    // The add landed server-side, but the local count was never updated
    // because it only ever comes from a successful load.
    assert_eq!(backend.cart_len(user_id), 1);
    assert_eq!(session.cart().count(), 0);

    // Once reads recover, a load reconciles.
    backend.set_fail_reads(false);
    session.cart().load(session.api()).await.unwrap();
    assert_eq!(session.cart().count(), 1);
}

#[tokio::test]
async fn load_replaces_snapshot_wholesale() {
    let backend = TestBackend::start().await;
    let laptop = ItemId::new(backend.seed_item("Laptop Pro", "active"));
    let phone = ItemId::new(backend.seed_item("Phone X", "active"));
    let (_, session) = authed_session(&backend).await;

    session.add_to_cart(laptop).await.unwrap();
    session.add_to_cart(phone).await.unwrap();

    let snapshot = session.cart().snapshot();
    assert_eq!(snapshot.count(), 2);
    assert!(snapshot.contains_item(laptop));
    assert!(snapshot.contains_item(phone));
}
