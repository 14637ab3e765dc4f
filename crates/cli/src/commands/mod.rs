//! CLI command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod menu;
pub mod order;

use std::time::Duration;

use tavola_client::api::ApiClient;
use tavola_client::cart::CartSync;
use tavola_client::config::ClientConfig;
use tavola_client::error::{ApiError, RateLimitInfo};
use tavola_client::session::Session;
use tavola_client::storage::{CartStorage, SessionStore};

/// Everything a command needs: the API client, the local stores, and the
/// session loaded from disk.
pub struct Context {
    pub api: ApiClient,
    pub cart_storage: CartStorage,
    pub session_store: SessionStore,
    pub session: Session,
}

impl Context {
    /// Build the context from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or the local data
    /// directory cannot be created.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = ClientConfig::from_env()?;
        let api = ApiClient::new(&config)?;
        let data_dir = config.data_dir.as_deref();
        let cart_storage = CartStorage::new(data_dir)?;
        let session_store = SessionStore::new(data_dir)?;
        let session = session_store.load();

        Ok(Self {
            api,
            cart_storage,
            session_store,
            session,
        })
    }

    /// A fresh cart synchronizer over this context's client and store.
    #[must_use]
    pub fn cart(&self) -> CartSync {
        CartSync::new(self.api.clone(), self.cart_storage.clone())
    }
}

/// Report a classified failure: the user-facing sentence, then any
/// field-level validation messages.
pub fn report_error(err: &ApiError) {
    tracing::error!("{}", err.user_message());
    for (field, message) in err.field_errors() {
        tracing::error!("  {field}: {message}");
    }
}

/// Tick down a rate-limit window, once per second, until it resets.
pub async fn wait_for_rate_limit(info: &RateLimitInfo) {
    let mut remaining = info.seconds_until_retry();
    if remaining == 0 {
        return;
    }
    tracing::info!("{}", info.message());

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately
    ticker.tick().await;
    while remaining > 0 {
        ticker.tick().await;
        remaining -= 1;
        if remaining > 0 && (remaining % 10 == 0 || remaining <= 3) {
            tracing::info!("Retrying in {remaining} seconds");
        }
    }
    tracing::info!("Rate-limit window reset, retrying");
}

/// Re-persist the cart after waiting out a rate limit, when asked to.
///
/// Any other failure (or a rate limit without `--wait`) propagates to the
/// caller; the optimistic in-memory update stands either way.
pub async fn finish_with_wait(
    cart: &mut CartSync,
    session: &Session,
    wait: bool,
    result: Result<(), ApiError>,
) -> Result<(), ApiError> {
    match result {
        Err(err) if wait => {
            if let Some(info) = err.rate_limit_info() {
                wait_for_rate_limit(&info).await;
                cart.flush(session).await
            } else {
                Err(err)
            }
        }
        other => other,
    }
}
