//! CLI command implementations.
//!
//! Each command is a thin view over one session operation: it reads or
//! mutates exactly one sub-model and renders the outcome, mirroring how a
//! graphical frontend would toast the same conditions.

mod cart;
mod catalog;
mod login;
mod orders;

pub use cart::{add, cart, checkout};
pub use catalog::items;
pub use login::login;
pub use orders::orders;
