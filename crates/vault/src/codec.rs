//! Envelope codec bound to the session key.
//!
//! The codec is stateless per call. It borrows the key from the injected
//! [`KeyStore`] and maps cipher-layer failures onto [`ServiceError`].

use common::ServiceError;

use crate::crypto::cipher::{decrypt_text, encrypt_text, CipherError};
use crate::key::{KeyStore, SessionKey};

/// Encrypts and decrypts text payloads under the session key.
#[derive(Clone, Debug)]
pub struct Codec {
    keys: KeyStore,
}

impl Codec {
    /// Bind a codec to `keys`. The store may still be uninitialised.
    pub fn new(keys: KeyStore) -> Self {
        Self { keys }
    }

    /// The key store this codec reads from.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Encrypt `plaintext` into a fresh envelope.
    ///
    /// # Errors
    ///
    /// [`ServiceError::KeyUnavailable`] before the key is ready,
    /// [`ServiceError::EncryptionFailure`] if the cipher rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, ServiceError> {
        let key = self.key()?;
        encrypt_text(plaintext, key.as_bytes())
            .map_err(|e| ServiceError::EncryptionFailure(e.to_string()))
    }

    /// Decrypt an envelope back into its plaintext.
    ///
    /// # Errors
    ///
    /// [`ServiceError::KeyUnavailable`] before the key is ready,
    /// [`ServiceError::MalformedEnvelope`] for text that is not base64 or is
    /// shorter than a nonce, [`ServiceError::DecryptionFailure`] when
    /// authentication fails.
    pub fn decrypt(&self, envelope: &str) -> Result<String, ServiceError> {
        let key = self.key()?;
        decrypt_text(envelope, key.as_bytes()).map_err(|e| match e {
            CipherError::InvalidEncoding | CipherError::TooShort(_) => {
                ServiceError::MalformedEnvelope(e.to_string())
            }
            CipherError::AeadFailure | CipherError::InvalidUtf8 => ServiceError::DecryptionFailure,
            CipherError::InvalidKeyLength => ServiceError::KeyUnavailable,
        })
    }

    fn key(&self) -> Result<&SessionKey, ServiceError> {
        self.keys.current().map_err(|_| ServiceError::KeyUnavailable)
    }
}
