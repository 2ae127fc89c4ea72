//! Shared wire types for the Bazaar backend contract.

pub mod cart;
pub mod id;
pub mod item;
pub mod order;
pub mod user;

pub use cart::{CartEntry, CartSnapshot, CartStatus};
pub use id::{CartId, ItemId, OrderId, UserId};
pub use item::{Item, ItemStatus};
pub use order::{Order, OrderStatus};
pub use user::{LoginRequest, LoginResponse, User};
