//! Tavola Core - Shared types library.
//!
//! This crate provides common types used across all Tavola components:
//! - `client` - REST API client, cart synchronizer, session
//! - `cli` - Command-line storefront for customers and admins
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, dishes, cart state, and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
