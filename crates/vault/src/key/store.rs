//! [`KeyStore`]: owner of the single long-lived session key.

use std::sync::Arc;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use super::storage::{KeyValueStorage, StorageError};
use crate::crypto::KEY_LEN;

/// Storage entry holding the raw session key bytes.
pub const KEY_ENTRY: &str = "sessionEncryptionKey";

/// Errors produced by the key layer.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The session key has not been initialised, or initialisation failed.
    #[error("session key not yet initialised")]
    NotInitialised,

    /// The persisted key material has an unexpected length.
    #[error("persisted session key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),

    /// Reading or writing the storage area failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The blocking initialisation task panicked or was cancelled.
    #[error("key initialisation task failed: {0}")]
    Task(String),
}

/// Fixed-size buffer holding exactly [`KEY_LEN`] bytes of key material.
///
/// Not `Clone`: the only copy lives in the [`KeyStore`] and is lent out by
/// reference. The memory is zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SessionKey(Box<[u8; KEY_LEN]>);

impl SessionKey {
    /// Generate a fresh AES-256-GCM key from the OS CSPRNG.
    ///
    /// The random bytes are written straight into the boxed buffer so no
    /// other copy of the key exists.
    pub fn generate() -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut buf[..]);
        Self(buf)
    }

    /// Import raw key bytes previously produced by [`SessionKey::as_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if `raw` is not [`KEY_LEN`] bytes.
    pub fn from_raw(raw: &[u8]) -> Result<Self, KeyError> {
        if raw.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(raw.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(raw);
        Ok(Self(buf))
    }

    /// Raw key bytes. Use for immediate cipher construction only.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("SessionKey([REDACTED])")
    }
}

/// Shared handle to the session key and the storage it persists to.
///
/// Two states: uninitialised (no key, every lookup fails) and ready. The only
/// transition is uninitialised → ready through [`KeyStore::initialize`];
/// once set, the key is never replaced or removed. Clones share the same
/// key.
#[derive(Clone)]
pub struct KeyStore {
    storage: Arc<dyn KeyValueStorage>,
    key: Arc<OnceCell<SessionKey>>,
}

impl KeyStore {
    /// Create an uninitialised store backed by `storage`.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            key: Arc::new(OnceCell::new()),
        }
    }

    /// Returns `true` once a key has been loaded or generated.
    pub fn is_ready(&self) -> bool {
        self.key.initialized()
    }

    /// Borrow the session key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotInitialised`] if no key is loaded yet.
    pub fn current(&self) -> Result<&SessionKey, KeyError> {
        self.key.get().ok_or(KeyError::NotInitialised)
    }

    /// Load the persisted key, or generate and persist one on first run.
    ///
    /// Concurrent callers are serialised: one runs the load-or-create step
    /// and the rest observe its result. Calling again after success is a
    /// no-op. On failure the store stays uninitialised and nothing is
    /// retried here.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Storage`] if the storage area cannot be read or
    /// written, and [`KeyError::InvalidLength`] if the persisted key is
    /// malformed. A malformed key is never overwritten.
    pub async fn initialize(&self) -> Result<(), KeyError> {
        self.key
            .get_or_try_init(|| async {
                let storage = Arc::clone(&self.storage);
                tokio::task::spawn_blocking(move || load_or_create(storage.as_ref()))
                    .await
                    .map_err(|e| KeyError::Task(e.to_string()))?
            })
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

fn load_or_create(storage: &dyn KeyValueStorage) -> Result<SessionKey, KeyError> {
    if let Some(raw) = storage.get(KEY_ENTRY)?.map(Zeroizing::new) {
        let key = SessionKey::from_raw(&raw)?;
        info!("loaded existing session key from storage");
        return Ok(key);
    }

    let key = SessionKey::generate();
    info!("generated new session key");
    storage.set(KEY_ENTRY, key.as_bytes())?;
    info!(entry = KEY_ENTRY, "stored new session key");
    Ok(key)
}
