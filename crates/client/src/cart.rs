//! Cart synchronization across the local and remote stores.
//!
//! [`CartSync`] owns the in-memory [`CartState`] and keeps it consistent
//! with whichever store is authoritative at the moment of each operation:
//! the local file for anonymous sessions, the remote cart endpoint for
//! signed-in ones. Mutations apply optimistically - the in-memory state
//! updates before persistence, and a persistence failure is reported to the
//! caller without reverting the update (the caller retries or reloads).
//!
//! There is no request sequencing for rapid consecutive mutations; each
//! persists independently, and callers that fire them concurrently can see
//! an earlier response overwrite a later optimistic state. The CLI awaits
//! every operation, so the window only exists for library consumers.

use serde_json::Value;
use tracing::{debug, warn};

use tavola_core::{CartLine, CartState, DishId, DishSnapshot};

use crate::api::ApiClient;
use crate::api::types::CartItemInput;
use crate::error::ApiError;
use crate::session::Session;
use crate::storage::CartStorage;

/// Load lifecycle of the synchronized cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

/// The synchronized cart.
pub struct CartSync {
    api: ApiClient,
    storage: CartStorage,
    state: CartState,
    phase: LoadPhase,
}

impl CartSync {
    /// Create an unloaded cart over the given client and local store.
    #[must_use]
    pub const fn new(api: ApiClient, storage: CartStorage) -> Self {
        Self {
            api,
            storage,
            state: CartState::empty(),
            phase: LoadPhase::Unloaded,
        }
    }

    /// The current in-memory cart.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Where the cart is in its load lifecycle.
    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Load the cart from the authoritative store.
    ///
    /// Anonymous: the local file. Signed in: the remote cart, mirrored to
    /// the local file on success and falling back to the local file on
    /// failure. Call this again after every login/logout - the previous
    /// cart is discarded, not merged.
    ///
    /// Never fails: every failure path degrades to an empty or partially
    /// filtered cart with a logged diagnostic.
    pub async fn load(&mut self, session: &Session) {
        self.phase = LoadPhase::Loading;
        let state = if session.is_authenticated() {
            match self.api.fetch_cart(session).await {
                Ok(remote) => {
                    let state = sanitize_lines(&remote.items);
                    // Mirror the validated remote cart as the offline fallback
                    if let Err(err) = self.storage.save(state.lines()) {
                        warn!(error = %err, "failed to mirror remote cart locally");
                    }
                    state
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "failed to fetch remote cart, falling back to local copy"
                    );
                    self.load_local()
                }
            }
        } else {
            self.load_local()
        };
        self.state = state;
        self.phase = LoadPhase::Loaded;
    }

    fn load_local(&self) -> CartState {
        sanitize_lines(&self.storage.load_raw())
    }

    /// Add `quantity` units of a dish. A line already present for the dish
    /// id is incremented rather than duplicated.
    ///
    /// # Errors
    ///
    /// Returns the classified persistence error; the optimistic in-memory
    /// update is kept either way.
    pub async fn add(
        &mut self,
        session: &Session,
        dish: DishSnapshot,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.state.add(dish, quantity);
        self.persist(session).await
    }

    /// Drop the line for a dish entirely.
    ///
    /// # Errors
    ///
    /// Returns the classified persistence error; the optimistic in-memory
    /// update is kept either way.
    pub async fn remove(&mut self, session: &Session, dish_id: DishId) -> Result<(), ApiError> {
        self.state.remove(dish_id);
        self.persist(session).await
    }

    /// Set the quantity for a dish. A quantity of zero or below behaves
    /// exactly like [`Self::remove`].
    ///
    /// # Errors
    ///
    /// Returns the classified persistence error; the optimistic in-memory
    /// update is kept either way.
    pub async fn update_quantity(
        &mut self,
        session: &Session,
        dish_id: DishId,
        quantity: i64,
    ) -> Result<(), ApiError> {
        if quantity <= 0 {
            return self.remove(session, dish_id).await;
        }
        self.state.set_quantity(dish_id, quantity);
        self.persist(session).await
    }

    /// Empty the cart everywhere, best effort.
    ///
    /// Signed in, the remote clear is requested first; whether or not it
    /// succeeds, the in-memory state empties and the local entry is
    /// removed. The user always ends with a visibly empty cart, so remote
    /// failures are logged rather than surfaced.
    pub async fn clear(&mut self, session: &Session) {
        if session.is_authenticated()
            && let Err(err) = self.api.clear_cart(session).await
        {
            warn!(error = %err, "remote cart clear failed");
        }
        self.state.clear();
        if let Err(err) = self.storage.remove() {
            warn!(error = %err, "failed to remove local cart entry");
        }
    }

    /// Re-persist the current in-memory state.
    ///
    /// Mutations keep their optimistic update when persistence fails; this
    /// is the retry half of that contract.
    ///
    /// # Errors
    ///
    /// Returns the classified persistence error.
    pub async fn flush(&mut self, session: &Session) -> Result<(), ApiError> {
        self.persist(session).await
    }

    /// Write the current state to the authoritative store.
    ///
    /// Signed in, the backend receives the full replacement set and its
    /// response becomes the new in-memory state (it is the final authority
    /// on the synchronized cart), mirrored to the local fallback.
    async fn persist(&mut self, session: &Session) -> Result<(), ApiError> {
        if session.is_authenticated() {
            let items = self
                .state
                .lines()
                .iter()
                .map(|line| CartItemInput {
                    dish_id: line.dish.id,
                    quantity: line.quantity,
                })
                .collect();
            let remote = self.api.replace_cart(session, items).await?;
            self.state = sanitize_lines(&remote.items);
            if let Err(err) = self.storage.save(self.state.lines()) {
                warn!(error = %err, "failed to mirror remote cart locally");
            }
            Ok(())
        } else {
            self.storage.save(self.state.lines()).map_err(ApiError::from)
        }
    }
}

/// Validate raw cart entries into a consistent state.
///
/// Entries that fail to parse as a [`CartLine`] (missing dish id, bad
/// quantity, unparseable price) are dropped individually; duplicates for
/// the same dish merge; zero quantities vanish. A partially corrupt input
/// yields the valid subset, never an error.
fn sanitize_lines(values: &[Value]) -> CartState {
    let mut state = CartState::empty();
    let mut dropped = 0_usize;
    for value in values {
        match serde_json::from_value::<CartLine>(value.clone()) {
            Ok(line) => state.add(line.dish, line.quantity),
            Err(err) => {
                dropped += 1;
                debug!(error = %err, "dropping invalid cart entry");
            }
        }
    }
    if dropped > 0 {
        warn!(dropped, "dropped invalid cart entries");
    }
    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use tavola_core::{CurrencyCode, Price};

    use super::*;
    use crate::config::ClientConfig;

    fn snapshot(id: i32) -> DishSnapshot {
        DishSnapshot {
            id: DishId::new(id),
            name: format!("dish-{id}"),
            price: Price::new(Decimal::new(750, 2), CurrencyCode::USD),
            is_available: true,
        }
    }

    fn offline_sync(dir: &std::path::Path) -> CartSync {
        // Port 9 (discard) is never served; the anonymous paths under test
        // never touch the network.
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let storage = CartStorage::new(Some(dir)).unwrap();
        CartSync::new(api, storage)
    }

    #[test]
    fn test_sanitize_drops_invalid_entries() {
        let values = vec![
            json!({
                "dish": {"id": 1, "name": "Soup", "price": {"amount": "4.50"}, "isAvailable": true},
                "quantity": 2
            }),
            // Missing dish id
            json!({
                "dish": {"name": "Ghost", "price": {"amount": "1.00"}, "isAvailable": true},
                "quantity": 1
            }),
            // Quantity not a number
            json!({
                "dish": {"id": 3, "name": "Salad", "price": {"amount": "6.00"}, "isAvailable": true},
                "quantity": "two"
            }),
            // Price not parseable
            json!({
                "dish": {"id": 4, "name": "Pasta", "price": {"amount": "a lot"}, "isAvailable": true},
                "quantity": 1
            }),
        ];

        let state = sanitize_lines(&values);
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.line(DishId::new(1)).unwrap().quantity, 2);
    }

    #[test]
    fn test_sanitize_merges_duplicate_dish_ids() {
        let entry = json!({
            "dish": {"id": 1, "name": "Soup", "price": {"amount": "4.50"}, "isAvailable": true},
            "quantity": 2
        });
        let state = sanitize_lines(&[entry.clone(), entry]);
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.line(DishId::new(1)).unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_anonymous_load_filters_corrupt_store() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = serde_json::to_vec_pretty(&json!([
            {
                "dish": {"id": 1, "name": "Soup", "price": {"amount": "4.50"}, "isAvailable": true},
                "quantity": 2
            },
            {"dish": {"name": "no id"}, "quantity": 1}
        ]))
        .unwrap();
        std::fs::write(dir.path().join("cart.json"), corrupt).unwrap();

        let mut cart = offline_sync(dir.path());
        assert_eq!(cart.phase(), LoadPhase::Unloaded);
        cart.load(&Session::anonymous()).await;

        assert_eq!(cart.phase(), LoadPhase::Loaded);
        assert_eq!(cart.state().lines().len(), 1);
        assert_eq!(cart.state().total_items(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_mutations_persist_locally() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::anonymous();
        let mut cart = offline_sync(dir.path());
        cart.load(&session).await;

        cart.add(&session, snapshot(1), 1).await.unwrap();
        cart.add(&session, snapshot(1), 2).await.unwrap();
        cart.add(&session, snapshot(2), 1).await.unwrap();
        assert_eq!(cart.state().total_items(), 4);

        // A fresh synchronizer over the same directory sees the same lines
        let mut reloaded = offline_sync(dir.path());
        reloaded.load(&session).await;
        assert_eq!(reloaded.state(), cart.state());
    }

    #[tokio::test]
    async fn test_update_quantity_zero_and_negative_remove() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::anonymous();

        for quantity in [0_i64, -5] {
            let mut cart = offline_sync(dir.path());
            cart.load(&session).await;
            cart.add(&session, snapshot(1), 3).await.unwrap();
            cart.update_quantity(&session, DishId::new(1), quantity)
                .await
                .unwrap();
            assert!(cart.state().is_empty());
        }
    }

    #[tokio::test]
    async fn test_clear_empties_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::anonymous();
        let mut cart = offline_sync(dir.path());
        cart.load(&session).await;
        cart.add(&session, snapshot(1), 2).await.unwrap();

        cart.clear(&session).await;
        assert!(cart.state().is_empty());
        assert!(!dir.path().join("cart.json").exists());
    }
}
