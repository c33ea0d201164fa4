//! High-level API for the stored credential pair.

use crate::{CredentialStorage, StorageKeys};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Access/refresh token pair produced by a successful login.
///
/// Invariant: after a login both tokens are stored, never one without
/// the other.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Durable home of the credential pair.
///
/// Wraps a storage backend and never propagates backend failures to the
/// caller: when a backend operation fails, the vault logs a warning and
/// flips to an in-memory mirror for the remainder of the process, so the
/// session keeps working without durability.
pub struct TokenVault {
    storage: Box<dyn CredentialStorage>,
    mirror: Mutex<HashMap<String, String>>,
    degraded: AtomicBool,
}

impl TokenVault {
    /// Create a vault over the given storage backend.
    pub fn new(storage: Box<dyn CredentialStorage>) -> Self {
        Self {
            storage,
            mirror: Mutex::new(HashMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Get the stored access token.
    pub fn access_token(&self) -> Option<String> {
        self.read(StorageKeys::ACCESS_TOKEN)
    }

    /// Get the stored refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.read(StorageKeys::REFRESH_TOKEN)
    }

    /// Store a full credential pair (login).
    pub fn store_tokens(&self, access_token: &str, refresh_token: &str) {
        self.write(StorageKeys::ACCESS_TOKEN, access_token);
        self.write(StorageKeys::REFRESH_TOKEN, refresh_token);
        debug!("Stored credential pair");
    }

    /// Replace only the access token (refresh exchange keeps the
    /// existing refresh token).
    pub fn store_access_token(&self, access_token: &str) {
        self.write(StorageKeys::ACCESS_TOKEN, access_token);
        debug!("Stored new access token");
    }

    /// Remove both tokens (logout or terminated session).
    pub fn clear(&self) {
        self.erase(StorageKeys::ACCESS_TOKEN);
        self.erase(StorageKeys::REFRESH_TOKEN);
        debug!("Cleared stored credentials");
    }

    /// Whether an access token is currently stored.
    pub fn has_session(&self) -> bool {
        self.access_token().is_some()
    }

    /// Whether the backend has failed and the vault is serving the
    /// in-memory mirror only.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn read(&self, key: &str) -> Option<String> {
        if self.is_degraded() {
            return self.mirror.lock().unwrap().get(key).cloned();
        }
        match self.storage.get(key) {
            Ok(Some(value)) => {
                self.mirror
                    .lock()
                    .unwrap()
                    .insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => {
                self.mirror.lock().unwrap().remove(key);
                None
            }
            Err(err) => {
                warn!(key, error = %err, "Credential storage read failed, serving in-memory state");
                self.degraded.store(true, Ordering::Relaxed);
                self.mirror.lock().unwrap().get(key).cloned()
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        self.mirror
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        if self.is_degraded() {
            return;
        }
        if let Err(err) = self.storage.set(key, value) {
            warn!(key, error = %err, "Credential storage write failed, continuing in memory only");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }

    fn erase(&self, key: &str) {
        self.mirror.lock().unwrap().remove(key);
        if self.is_degraded() {
            return;
        }
        if let Err(err) = self.storage.remove(key) {
            warn!(key, error = %err, "Credential storage remove failed, continuing in memory only");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }
}
