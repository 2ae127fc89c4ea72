//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `storefront` - Session client library for the REST backend
//! - `cli` - Command-line storefront driver
//! - `integration-tests` - End-to-end tests against a stub backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! here mirrors the backend's wire contract exactly; the backend is the
//! single source of truth and these types are read-side snapshots of it.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the catalog/cart/order/user wire types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
