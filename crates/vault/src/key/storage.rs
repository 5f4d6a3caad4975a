//! Extension-local persistent storage: a small key-value area that survives
//! restarts.
//!
//! [`FileStorage`] keeps every entry in one JSON object on disk, with byte
//! values base64-encoded. The file is created owner-only (`0o600` on Unix)
//! since it holds the session key. [`MemoryStorage`] is a process-local
//! stand-in.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// Errors produced by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The backing file exists but does not hold a valid storage object.
    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
}

/// Byte-valued key-value storage.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStorage: Send + Sync {
    /// Read the entry named `name`, or `None` if it has never been written.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Create or overwrite the entry named `name`.
    fn set(&self, name: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// The decoded storage object. Entry values are wiped on drop.
#[derive(Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Entries(BTreeMap<String, String>);

impl Drop for Entries {
    fn drop(&mut self) {
        self.0.values_mut().for_each(Zeroize::zeroize);
    }
}

/// Storage area persisted as a JSON object file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use (or later create) the storage file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the whole object to a sibling temp file, then rename over the
    /// original so readers never see a partial write.
    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = Zeroizing::new(
            serde_json::to_vec_pretty(entries).map_err(|e| StorageError::Corrupt(e.to_string()))?,
        );
        let tmp = self.path.with_extension("tmp");
        write_private(&tmp, &body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Write `body` to `path`, readable and writable by the owner only.
fn write_private(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // A leftover temp file keeps its old mode, so tighten it explicitly.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(body)?;
    file.sync_all()
}

impl KeyValueStorage for FileStorage {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self.load()?;
        entries
            .0
            .get(name)
            .map(|encoded| {
                STANDARD
                    .decode(encoded)
                    .map_err(|_| StorageError::Corrupt(format!("entry {name:?} is not base64")))
            })
            .transpose()
    }

    fn set(&self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if let Some(mut old) = entries.0.insert(name.to_owned(), STANDARD.encode(value)) {
            old.zeroize();
        }
        self.save(&entries)?;
        debug!(path = %self.path.display(), entry = name, "storage entry written");
        Ok(())
    }
}

/// Storage area that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Zeroizing<Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage area.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("MemoryStorage")
            .field("entries", &entries.len())
            .finish()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(name).map(|value| value.to_vec()))
    }

    fn set(&self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(name.to_owned(), Zeroizing::new(value.to_vec()));
        Ok(())
    }
}
