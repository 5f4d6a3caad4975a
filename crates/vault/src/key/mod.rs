//! Session key lifecycle: load or create once, then hold for the life of the
//! process.
//!
//! # Lifecycle
//!
//! 1. At startup, [`startup`] runs [`KeyStore::initialize`], which reads the
//!    `sessionEncryptionKey` entry from the storage area.
//! 2. If the entry exists it is imported; otherwise a fresh 256-bit key is
//!    generated and written once.
//! 3. The key then lives in the [`KeyStore`] until the process exits. There
//!    is no rotation and no teardown.
//!
//! # Security invariants
//!
//! - Key material is never logged or included in error messages.
//! - Losing the storage file makes every exported session permanently
//!   undecryptable. A missing or malformed key is never silently replaced
//!   once exports may exist under it.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{KeyError, KeyStore, SessionKey, KEY_ENTRY};

use tracing::{error, info};

/// Initialise `store` during startup, logging the outcome.
///
/// Failure is not fatal to the process: the store stays uninitialised and
/// every encrypt/decrypt request is rejected with a key-unavailable error.
/// Returns whether the key is ready.
pub async fn startup(store: &KeyStore) -> bool {
    match store.initialize().await {
        Ok(()) => {
            info!("session key ready");
            true
        }
        Err(e) => {
            error!(error = %e, "error initialising session key; requests will be rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn startup_reports_ready() {
        let store = KeyStore::new(Arc::new(MemoryStorage::new()));
        assert!(startup(&store).await);
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn startup_survives_failure() {
        let mut storage = storage::MockKeyValueStorage::new();
        storage
            .expect_get()
            .returning(|_| Err(StorageError::Corrupt("truncated".into())));
        let store = KeyStore::new(Arc::new(storage));
        assert!(!startup(&store).await);
        assert!(!store.is_ready());
    }
}
