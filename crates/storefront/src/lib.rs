//! Bazaar Storefront - session client for the Bazaar REST backend.
//!
//! The backend is the single source of truth for catalog, cart, and orders.
//! This crate keeps a locally-held view of that truth consistent with it
//! while tolerating network latency, duplicate user actions, and partial
//! failures. It is deliberately presentation-free: any view layer (CLI,
//! TUI, web frontend) consumes the same [`session::Session`].
//!
//! # Architecture
//!
//! Three cooperating sub-models compose the storefront session:
//!
//! - [`catalog`] - cached item list, replaced wholesale on refresh, plus a
//!   pure search/category filter
//! - [`cart`] - the authoritative cart snapshot, resynchronized from the
//!   backend after every successful mutation
//! - [`checkout`] - a short-lived flow converting the cart into an order
//!
//! Sub-models never depend on each other's internal representation; they
//! compose only through the backend. Local state is always replaced
//! wholesale, never merged, so there is nothing to lock beyond the
//! last-fetched snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::config::ClientConfig;
//! use bazaar_storefront::session::Session;
//! use secrecy::SecretString;
//!
//! let session = Session::new(ClientConfig::from_env()?)?;
//! let user = session.login("alice", &SecretString::from("password")).await?;
//! session.start().await;
//!
//! let items = session.filtered_items("lap", "all");
//! session.add_to_cart(items[0].id).await?;
//! let order = session.checkout().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod images;
pub mod orders;
pub mod session;

pub use api::ApiClient;
pub use error::ApiError;
pub use session::Session;
