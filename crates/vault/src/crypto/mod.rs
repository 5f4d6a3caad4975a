//! AES-256-GCM envelope primitives.
//!
//! This module is free of storage and HTTP dependencies. It provides the
//! low-level encrypt/decrypt operations used by [`crate::codec`].
//!
//! # Envelope format
//!
//! ```text
//! base64(nonce[12] || ciphertext || tag[16])
//! ```
//!
//! Standard alphabet with padding on output. The layout is byte-compatible
//! with files written by the browser extension through WebCrypto.

pub mod cipher;

pub use cipher::{CipherError, KEY_LEN, NONCE_LEN};
