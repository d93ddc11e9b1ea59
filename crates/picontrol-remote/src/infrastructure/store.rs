//! Small persisted key-value store for user preferences.
//!
//! The only preference today is the remote host name, kept under the key
//! [`HOST_KEY`] so that the user types it once and later sessions reuse it.
//!
//! [`FileStore`] keeps a flat TOML table next to the config file:
//!
//! ```toml
//! raspberry-host = "192.168.1.20"
//! ```
//!
//! [`MemoryStore`] is the same thing without a file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

/// Key under which the remote host name is stored.
pub const HOST_KEY: &str = "raspberry-host";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error accessing store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// String-to-string persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`.  Returns `true` if it was present.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// TOML-file-backed store.  The file is read on every access, so edits made
/// by hand between sessions are picked up.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store named `store.toml` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("store.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string(entries)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write(&entries)?;
        Ok(true)
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries().remove(key).is_some())
    }
}

// ── HostPreference ────────────────────────────────────────────────────────────

/// Remembers which host the user last connected to.
pub struct HostPreference<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> HostPreference<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The remembered host, if any.  A blank stored value counts as none.
    pub fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(HOST_KEY)?
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty()))
    }

    pub fn remember(&self, host: &str) -> Result<(), StoreError> {
        self.store.set(HOST_KEY, host.trim())?;
        debug!(host = host.trim(), "host remembered");
        Ok(())
    }

    /// Forgets the remembered host.  Returns `true` if one was stored.
    pub fn forget(&self) -> Result<bool, StoreError> {
        let removed = self.store.remove(HOST_KEY)?;
        if removed {
            info!("remembered host removed");
        }
        Ok(removed)
    }

    /// Picks the host for this session.
    ///
    /// A host given explicitly wins and is remembered for next time; otherwise
    /// the remembered host is used.  `Ok(None)` means the user has to supply
    /// one.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<Option<String>, StoreError> {
        match explicit.map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => {
                self.remember(host)?;
                Ok(Some(host.to_string()))
            }
            None => self.load(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
