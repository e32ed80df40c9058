//! Storage double that fails on demand.

use std::{collections::BTreeMap, io, path::PathBuf};

use super::{
    ACCESS_TOKEN_KEY, KeyValueStorage, MemoryStorage, REFRESH_TOKEN_KEY, StorageError,
    StorageResult,
};

/// In-memory storage whose reads, or writes to one key, can be made to fail
/// the way a full or unreadable disk would.
#[derive(Debug, Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryStorage,
    failing_key: Option<String>,
    failing_reads: bool,
}

impl FlakyStorage {
    /// Start with a stored `(access, refresh)` pair, or nothing.
    pub(crate) fn seeded(pair: Option<(&str, &str)>) -> Self {
        let inner = match pair {
            Some((access, refresh)) => {
                MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)])
            }
            None => MemoryStorage::new(),
        };
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Fail every `set` and `remove` of `key`.
    pub(crate) fn failing_writes_to(mut self, key: &str) -> Self {
        self.failing_key = Some(key.to_string());
        self
    }

    /// Fail every `get`.
    pub(crate) fn failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.snapshot().unwrap()
    }

    fn check_write(&self, key: &str) -> StorageResult<()> {
        if self.failing_key.as_deref() == Some(key) {
            return Err(StorageError::Io {
                path: PathBuf::from("storage.json"),
                source: io::Error::other("no space left on device"),
            });
        }
        Ok(())
    }
}

impl KeyValueStorage for FlakyStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.failing_reads {
            return Err(StorageError::Io {
                path: PathBuf::from("storage.json"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_write(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_write(key)?;
        self.inner.remove(key)
    }
}
