use shared::models::AuthTokens;
use tracing::warn;

use super::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SharedStorage, StorageResult};

/// Typed view over the persisted access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenStore {
    storage: SharedStorage,
}

impl TokenStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// # Errors
    /// Returns an error if storage cannot be read.
    pub fn access(&self) -> StorageResult<Option<String>> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    /// # Errors
    /// Returns an error if storage cannot be read.
    pub fn refresh(&self) -> StorageResult<Option<String>> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    /// The stored pair, if both halves are present.
    ///
    /// # Errors
    /// Returns an error if storage cannot be read.
    pub fn pair(&self) -> StorageResult<Option<AuthTokens>> {
        Ok(match (self.access()?, self.refresh()?) {
            (Some(access), Some(refresh)) => Some(AuthTokens { access, refresh }),
            _ => None,
        })
    }

    /// Persist both tokens.
    ///
    /// If the refresh token cannot be written, the access token is put back
    /// to what it was, so a failed save never leaves a mixed pair.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn save(&self, tokens: &AuthTokens) -> StorageResult<()> {
        let prior_access = self.access().ok().flatten();
        self.storage.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        if let Err(err) = self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh) {
            let rollback = match prior_access {
                Some(access) => self.storage.set(ACCESS_TOKEN_KEY, &access),
                None => self.storage.remove(ACCESS_TOKEN_KEY),
            };
            if let Err(rollback_err) = rollback {
                warn!(error = %rollback_err, "could not roll back access token");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Replace the access token after a refresh, and the refresh token too
    /// when the server rotated it.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn save_refreshed(&self, access: &str, refresh: Option<&str>) -> StorageResult<()> {
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        if let Some(refresh) = refresh {
            self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    /// Put back a pair captured earlier with [`TokenStore::pair`], or clear
    /// both keys when nothing was stored.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn restore(&self, previous: Option<&AuthTokens>) -> StorageResult<()> {
        match previous {
            Some(tokens) => self.save(tokens),
            None => self.clear(),
        }
    }

    /// Remove both tokens. Both removals are attempted even if the first fails.
    ///
    /// # Errors
    /// Returns the first storage error encountered.
    pub fn clear(&self) -> StorageResult<()> {
        let access = self.storage.remove(ACCESS_TOKEN_KEY);
        let refresh = self.storage.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }

    /// [`TokenStore::clear`] for paths that must not fail; problems are logged.
    pub fn clear_quietly(&self) {
        if let Err(err) = self.clear() {
            warn!(error = %err, "failed to clear stored session tokens");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError, testing::FlakyStorage};
    use std::sync::Arc;

    fn tokens(access: &str, refresh: &str) -> AuthTokens {
        AuthTokens {
            access: access.to_string(),
            refresh: refresh.to_string(),
        }
    }

    #[test]
    fn test_save_and_clear() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        store.save(&tokens("a", "r")).unwrap();

        assert_eq!(store.pair().unwrap(), Some(tokens("a", "r")));

        store.clear().unwrap();
        assert_eq!(store.access().unwrap(), None);
        assert_eq!(store.refresh().unwrap(), None);
    }

    #[test]
    fn test_refresh_without_rotation_keeps_refresh_token() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        store.save(&tokens("a1", "r1")).unwrap();

        store.save_refreshed("a2", None).unwrap();
        assert_eq!(store.pair().unwrap(), Some(tokens("a2", "r1")));

        store.save_refreshed("a3", Some("r3")).unwrap();
        assert_eq!(store.pair().unwrap(), Some(tokens("a3", "r3")));
    }

    #[test]
    fn test_restore_previous_pair() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        store.save(&tokens("new", "new")).unwrap();

        store.restore(Some(&tokens("old", "old"))).unwrap();
        assert_eq!(store.pair().unwrap(), Some(tokens("old", "old")));

        store.restore(None).unwrap();
        assert_eq!(store.pair().unwrap(), None);
    }

    #[test]
    fn test_failed_save_keeps_previous_pair() {
        let storage = Arc::new(
            FlakyStorage::seeded(Some(("old-access", "old-refresh")))
                .failing_writes_to(REFRESH_TOKEN_KEY),
        );
        let store = TokenStore::new(storage);

        let err = store.save(&tokens("new-access", "new-refresh")).unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(store.pair().unwrap(), Some(tokens("old-access", "old-refresh")));
    }

    #[test]
    fn test_failed_first_save_stores_nothing() {
        let storage = Arc::new(FlakyStorage::seeded(None).failing_writes_to(REFRESH_TOKEN_KEY));
        let store = TokenStore::new(storage);

        assert!(store.save(&tokens("a", "r")).is_err());
        assert_eq!(store.access().unwrap(), None);
        assert_eq!(store.refresh().unwrap(), None);
    }

    #[test]
    fn test_half_pair_is_not_a_pair() {
        let storage = Arc::new(MemoryStorage::with_entries([("access_token", "a")]));
        let store = TokenStore::new(storage);

        assert_eq!(store.pair().unwrap(), None);
        assert_eq!(store.access().unwrap().as_deref(), Some("a"));
    }
}
