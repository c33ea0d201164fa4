//! Credential storage for the Cantina client.
//!
//! Persists the access/refresh token pair across process runs. The
//! storage surface is a small key/value trait so embedders and tests can
//! substitute their own backend; the default backend is a JSON file
//! under the client base directory.

mod file;
mod keys;
mod traits;
mod vault;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use traits::CredentialStorage;
pub use vault::{CredentialPair, TokenVault};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error (quota, permissions, ...)
    #[error("Backend storage error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default file-backed storage under `~/.cantina`.
pub fn create_storage() -> StorageResult<Box<dyn CredentialStorage>> {
    let paths =
        client_core::Paths::new().map_err(|err| StorageError::Backend(err.to_string()))?;
    Ok(Box::new(FileStorage::new(paths.credentials_file())))
}

/// Create a TokenVault backed by the default storage.
pub fn create_token_vault() -> StorageResult<TokenVault> {
    Ok(TokenVault::new(create_storage()?))
}
