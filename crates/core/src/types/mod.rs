//! Core types for Tavola.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod dish;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use cart::{CartLine, CartState};
pub use dish::{Dish, DishCategory, DishSnapshot};
pub use id::*;
pub use order::Order;
pub use price::{CurrencyCode, Price};
pub use status::OrderStatus;
