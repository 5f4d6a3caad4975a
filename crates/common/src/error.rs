//! Common error types shared across crates.

use thiserror::Error;

/// Error returned by the background service for a rejected message.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::MalformedEnvelope`] → 400
/// - [`ServiceError::DecryptionFailure`] → 422
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::KeyUnavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The session key was never initialised, or initialisation failed.
    #[error("session key unavailable")]
    KeyUnavailable,

    /// The cipher rejected otherwise valid input. Not expected in practice.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The envelope text is not valid base64 or is too short to hold a nonce.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authentication failed: tampered data, truncated ciphertext, or a different key.
    #[error("decryption failure")]
    DecryptionFailure,
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::KeyUnavailable => 503,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::MalformedEnvelope(_) => 400,
            ServiceError::DecryptionFailure => 422,
        }
    }

    /// Short machine-readable code carried in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::KeyUnavailable => "key_unavailable",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::MalformedEnvelope(_) => "malformed_envelope",
            ServiceError::DecryptionFailure => "decryption_failure",
        }
    }
}
