#![allow(dead_code)]

use api_client::ApiClient;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credential_store::{CredentialStorage, StorageResult, TokenVault};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory storage for testing.
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl CredentialStorage for MemoryStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().unwrap().remove(key).is_some())
    }
}

pub fn new_vault() -> Arc<TokenVault> {
    Arc::new(TokenVault::new(Box::new(MemoryStorage::new())))
}

pub fn new_client(base_url: &str) -> (ApiClient, Arc<TokenVault>) {
    let vault = new_vault();
    let client = ApiClient::new(base_url, vault.clone()).expect("valid base url");
    (client, vault)
}

/// Build a compact three-segment token around the given payload.
pub fn make_token(payload: &serde_json::Value) -> String {
    format!(
        "header.{}.signature",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}
