//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::codec::Codec;
use crate::key::{KeyStore, MemoryStorage};
use crate::service::MessageService;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the service only holds `Arc`-backed handles.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Dispatcher for `encrypt` / `decrypt` messages.
    pub service: MessageService,
}

impl AppState {
    /// Create a new [`AppState`] around `service`.
    pub fn new(service: MessageService) -> Self {
        Self { service }
    }
}

impl Default for AppState {
    /// An uninitialised key store over in-memory storage, suitable for tests.
    fn default() -> Self {
        let keys = KeyStore::new(Arc::new(MemoryStorage::new()));
        Self::new(MessageService::new(Codec::new(keys)))
    }
}
