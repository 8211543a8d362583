//! Durable session vault.
//!
//! One explicit service owns every durable key the session machinery
//! touches: the token bundle plus the per-user sync and profile-fetch
//! markers. Components receive a vault, never raw key strings, so two
//! parts of the system cannot drift on a shared key by accident.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use juniper_core::UserId;

use crate::models::{TokenBundle, vault_keys};

/// Durable string key-value storage.
///
/// The process-local analog of the browser's persistent storage: shared,
/// synchronous, and unscoped, so writes from concurrent owners race
/// last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value.
    fn set(&self, key: &str, value: String);
    /// Remove a value.
    fn remove(&self, key: &str);
    /// All stored keys.
    fn keys(&self) -> Vec<String>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .map(|entries| entries.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// The session synchronizer's view of durable storage.
#[derive(Clone)]
pub struct SessionVault {
    store: Arc<dyn KeyValueStore>,
}

impl SessionVault {
    /// Create a vault over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted token bundle.
    ///
    /// An unparseable bundle is removed and treated as absent.
    #[must_use]
    pub fn read_token_bundle(&self) -> Option<TokenBundle> {
        let raw = self.store.get(vault_keys::ACCESS_TOKEN)?;
        match serde_json::from_str(&raw) {
            Ok(bundle) => Some(bundle),
            Err(err) => {
                warn!(error = %err, "Discarding unparseable token bundle");
                self.store.remove(vault_keys::ACCESS_TOKEN);
                None
            }
        }
    }

    /// Persist a token bundle.
    pub fn write_token_bundle(&self, bundle: &TokenBundle) {
        match serde_json::to_string(bundle) {
            Ok(raw) => self.store.set(vault_keys::ACCESS_TOKEN, raw),
            Err(err) => warn!(error = %err, "Failed to serialize token bundle"),
        }
    }

    /// Remove the token bundle.
    pub fn clear_token_bundle(&self) {
        self.store.remove(vault_keys::ACCESS_TOKEN);
    }

    /// Read a user's last-sync timestamp (epoch ms).
    #[must_use]
    pub fn read_last_sync(&self, user_id: UserId) -> Option<i64> {
        self.store
            .get(&vault_keys::auth_sync(user_id))?
            .parse()
            .ok()
    }

    /// Stamp a user's last-sync timestamp.
    pub fn stamp_last_sync(&self, user_id: UserId, now_ms: i64) {
        self.store
            .set(&vault_keys::auth_sync(user_id), now_ms.to_string());
    }

    /// Stamp a user's profile-fetch timestamp.
    pub fn stamp_profile_fetch(&self, user_id: UserId, now_ms: i64) {
        self.store
            .set(&vault_keys::profile_fetch(user_id), now_ms.to_string());
    }

    /// Remove the token bundle and every session marker key.
    ///
    /// After this, no key with a session-owned prefix remains.
    pub fn clear_session_keys(&self) {
        self.store.remove(vault_keys::ACCESS_TOKEN);
        for key in self.store.keys() {
            if key.starts_with(vault_keys::AUTH_SYNC_PREFIX)
                || key.starts_with(vault_keys::PROFILE_FETCH_PREFIX)
            {
                self.store.remove(&key);
            }
        }
    }
}
