//! Saving and restoring the diagram.
//!
//! A diagram is persisted as one JSON [`Snapshot`] under a single key of a
//! string key/value [`Storage`]. Saving overwrites the slot; there is no
//! history.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use thiserror::Error;

use flowpad_core::snapshot::Snapshot;

/// Errors raised by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage file `{path}` is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot save diagram: {0} has a coordinate that is not a finite number")]
    NonFinite(String),
}

/// String key/value store in the manner of browser local storage.
pub trait Storage {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage that lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object file mapping keys to string values.
///
/// A missing file reads as empty. Writes create the parent directory if
/// needed and replace the file atomically.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, &items)?;
        file.write_all(b"\n")?;
        file.persist(&self.path).map_err(|err| err.error)?;

        debug!(path:? = self.path, key = key; "Storage file written");
        Ok(())
    }
}

/// Writes `snapshot` under `key`, overwriting whatever was there.
///
/// # Errors
///
/// Returns [`StorageError::NonFinite`] when the snapshot holds an infinite
/// or NaN coordinate, since JSON would store it as `null` and the diagram
/// could not be restored. Otherwise returns the storage backend's error.
pub fn save(
    storage: &mut dyn Storage,
    key: &str,
    snapshot: &Snapshot,
) -> Result<(), StorageError> {
    if let Some(element) = snapshot.find_non_finite() {
        return Err(StorageError::NonFinite(element));
    }
    let value = serde_json::to_string(snapshot)?;
    storage.set_item(key, &value)?;

    info!(
        key = key,
        nodes = snapshot.nodes().len(),
        edges = snapshot.edges().len();
        "Diagram saved"
    );
    Ok(())
}

/// Reads the snapshot stored under `key`.
///
/// Returns `None` when nothing is stored, when the backend fails, or when
/// the stored value does not decode; the latter two are logged.
pub fn restore(storage: &dyn Storage, key: &str) -> Option<Snapshot> {
    let value = match storage.get_item(key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(key = key; "Nothing saved under key");
            return None;
        }
        Err(err) => {
            warn!(key = key, err:% = err; "Failed to read storage");
            return None;
        }
    };

    match serde_json::from_str::<Snapshot>(&value) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(key = key, err:% = err; "Saved diagram is unreadable");
            None
        }
    }
}
