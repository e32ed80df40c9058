use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use super::{KeyValueStorage, StorageError, StorageResult};

const FILE_NAME: &str = "storage.json";

/// Storage kept as a single JSON object on disk.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written namespace behind. Writers
/// within one process are serialised; other processes sharing the file are
/// not coordinated.
///
/// A file that no longer parses is reported by reads. The next write
/// starts over from an empty namespace and replaces it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open (or prepare to create) the namespace file inside `dir`.
    ///
    /// # Errors
    /// Returns an error if `dir` cannot be created.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: dir.join(FILE_NAME),
            lock: Mutex::new(()),
        })
    }

    /// Location of the namespace file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let encoded =
            serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
                key: FILE_NAME.to_string(),
                source,
            })?;
        let staging = self.path.with_extension("json.tmp");
        let io_err = |source: io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&staging, encoded.as_bytes()).map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staging, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        fs::rename(&staging, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), keys = entries.len(), "storage persisted");
        Ok(())
    }

    fn update<F>(&self, change: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let (mut entries, recovered) = match self.read_all() {
            Ok(entries) => (entries, false),
            Err(err @ StorageError::Corrupt { .. }) => {
                warn!(error = %err, "discarding unreadable storage file");
                (BTreeMap::new(), true)
            }
            Err(err) => return Err(err),
        };
        if change(&mut entries) || recovered {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
