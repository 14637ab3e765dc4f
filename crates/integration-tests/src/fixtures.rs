//! Shared fixtures: wire-shaped JSON builders and a throwaway client
//! environment over a mock server and a temp data directory.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;

use tavola_client::api::ApiClient;
use tavola_client::cart::CartSync;
use tavola_client::config::ClientConfig;
use tavola_client::session::{Session, UserProfile};
use tavola_client::storage::{CartStorage, SessionStore};
use tavola_core::{CurrencyCode, DishId, DishSnapshot, Price, UserId};

/// A cart line in the backend's wire shape.
#[must_use]
pub fn line_json(id: i32, name: &str, price: &str, quantity: u32) -> Value {
    json!({
        "dish": {
            "id": id,
            "name": name,
            "price": {"amount": price},
            "isAvailable": true
        },
        "quantity": quantity
    })
}

/// A `GET /cart`-shaped success body around the given items.
#[must_use]
pub fn cart_body(items: &[Value]) -> String {
    json!({
        "data": {
            "cart": {
                "items": items,
                "totalItems": 0,
                "totalPrice": {"amount": "0.00"}
            }
        }
    })
    .to_string()
}

/// A dish snapshot matching [`line_json`]'s pricing.
#[must_use]
#[allow(clippy::missing_panics_doc)]
pub fn snapshot(id: i32, name: &str, price: &str) -> DishSnapshot {
    DishSnapshot {
        id: DishId::new(id),
        name: name.to_string(),
        price: Price::new(
            price.parse::<Decimal>().expect("fixture price"),
            CurrencyCode::USD,
        ),
        is_available: true,
    }
}

/// A signed-in session carrying a fixed test token.
#[must_use]
pub fn signed_in() -> Session {
    Session::authenticated(
        SecretString::from("test-token"),
        UserProfile {
            id: UserId::new(1),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            is_admin: false,
        },
    )
}

/// Client, stores, and cart synchronizer wired to a base URL and a temp
/// data directory that lives as long as the value.
pub struct TestEnv {
    pub api: ApiClient,
    pub storage: CartStorage,
    pub sessions: SessionStore,
    dir: TempDir,
}

impl TestEnv {
    /// Build the environment against the given mock-server URL.
    ///
    /// # Panics
    ///
    /// Panics on setup failure; these are test fixtures.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let config = ClientConfig::new(base_url).expect("config");
        let api = ApiClient::new(&config).expect("client");
        let storage = CartStorage::new(Some(dir.path())).expect("cart storage");
        let sessions = SessionStore::new(Some(dir.path())).expect("session store");
        Self {
            api,
            storage,
            sessions,
            dir,
        }
    }

    /// A fresh synchronizer over this environment's client and store.
    #[must_use]
    pub fn cart(&self) -> CartSync {
        CartSync::new(self.api.clone(), self.storage.clone())
    }

    /// Path of the local cart file.
    #[must_use]
    pub fn cart_file(&self) -> std::path::PathBuf {
        self.dir.path().join("cart.json")
    }
}
