//! Tavola client library.
//!
//! A typed client for the Tavola food-ordering backend:
//!
//! - [`api::ApiClient`] - REST client for auth, menu, cart, order, and
//!   admin endpoints
//! - [`cart::CartSync`] - the in-memory cart and its synchronization with
//!   the authoritative store (local file when anonymous, remote cart when
//!   signed in)
//! - [`error::ApiError`] - failed-call classification: user-presentable
//!   messages, field-level validation errors, rate-limit metadata
//! - [`session::Session`] - explicitly owned auth state, replaced
//!   wholesale on login/logout
//! - [`storage`] - JSON files under the platform data directory
//!
//! # Example
//!
//! ```rust,ignore
//! use tavola_client::{api::ApiClient, cart::CartSync, config::ClientConfig};
//! use tavola_client::session::Session;
//! use tavola_client::storage::CartStorage;
//!
//! let config = ClientConfig::from_env()?;
//! let api = ApiClient::new(&config)?;
//! let storage = CartStorage::new(config.data_dir.as_deref())?;
//! let session = Session::anonymous();
//!
//! let mut cart = CartSync::new(api.clone(), storage);
//! cart.load(&session).await;
//! cart.add(&session, dish.snapshot(), 1).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use cart::CartSync;
pub use config::ClientConfig;
pub use error::{ApiError, RateLimitInfo};
pub use session::Session;
