//! Local persistence: the cart fallback store and the session file.
//!
//! Plain JSON files under the platform data directory. The cart file is the
//! authoritative store for anonymous users and an offline fallback cache
//! for signed-in users; the session file keeps the CLI authenticated across
//! invocations. There is exactly one logical writer, so plain reads and
//! writes are sufficient.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use tavola_core::CartLine;

use crate::session::{Session, UserProfile};

const CART_FILE: &str = "cart.json";
const SESSION_FILE: &str = "session.json";

/// Errors from the local stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not resolve local data directory")]
    NoDataDir,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Resolve the data directory: an explicit override, or the platform dir.
fn resolve_dir(override_dir: Option<&Path>) -> Result<PathBuf, StorageError> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("app", "Tavola", "Tavola")
            .ok_or(StorageError::NoDataDir)?
            .data_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

// =============================================================================
// Cart storage
// =============================================================================

/// File-backed store for the serialized cart line list.
#[derive(Debug, Clone)]
pub struct CartStorage {
    dir: PathBuf,
}

impl CartStorage {
    /// Open the store, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be resolved or created.
    pub fn new(override_dir: Option<&Path>) -> Result<Self, StorageError> {
        Ok(Self {
            dir: resolve_dir(override_dir)?,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(CART_FILE)
    }

    /// Read the stored entries as raw JSON values.
    ///
    /// Never fails: a missing, unreadable, or malformed file yields an
    /// empty list (with a diagnostic), and per-entry validation is the
    /// caller's job so one corrupt entry cannot poison the rest.
    #[must_use]
    pub fn load_raw(&self) -> Vec<Value> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no local cart file");
                return Vec::new();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read local cart");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(path = %path.display(), "local cart is not a list, discarding");
                Vec::new()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "local cart is malformed, discarding");
                Vec::new()
            }
        }
    }

    /// Overwrite the store with the given line list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(lines)?;
        fs::write(self.path(), bytes)?;
        Ok(())
    }

    /// Delete the store entry. Deleting an absent entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Whether a cart entry currently exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path().exists()
    }
}

// =============================================================================
// Session storage
// =============================================================================

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: UserProfile,
}

/// File-backed store for the auth session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Open the store, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be resolved or created.
    pub fn new(override_dir: Option<&Path>) -> Result<Self, StorageError> {
        Ok(Self {
            dir: resolve_dir(override_dir)?,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Load the persisted session; anonymous when absent or unreadable.
    #[must_use]
    pub fn load(&self) -> Session {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Session::anonymous(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read session file");
                return Session::anonymous();
            }
        };
        match serde_json::from_slice::<StoredSession>(&bytes) {
            Ok(stored) => {
                Session::authenticated(SecretString::from(stored.token), stored.user)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "session file is malformed, ignoring");
                Session::anonymous()
            }
        }
    }

    /// Persist an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, token: &SecretString, user: &UserProfile) -> Result<(), StorageError> {
        let stored = StoredSession {
            token: token.expose_secret().to_string(),
            user: user.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&stored)?;
        fs::write(self.path(), bytes)?;
        Ok(())
    }

    /// Forget the persisted session. Clearing an absent session is fine.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}
