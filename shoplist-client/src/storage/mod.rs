//! Durable client-side storage.
//!
//! A flat string key-value namespace standing in for the browser's
//! `localStorage`. The API client and the state containers share one
//! instance through [`SharedStorage`].

mod file;
mod memory;
#[cfg(test)]
pub(crate) mod testing;
mod tokens;

use std::{fmt, io, path::PathBuf, sync::Arc};

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use tokens::TokenStore;

/// Key holding the JWT access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the JWT refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key holding the per-group tab preference map.
pub const GROUP_TABS_KEY: &str = "group-tabs-storage";

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures of the durable storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string key-value namespace that survives process restarts.
pub trait KeyValueStorage: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Storage handle shared between the API client and state containers.
pub type SharedStorage = Arc<dyn KeyValueStorage>;
