//! Request and response types exchanged between the UI side and the
//! background service.
//!
//! Field names follow the extension message format (`plainText`,
//! `cipherText`) so the JSON is interchangeable with the browser runtime
//! messages.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A one-shot request sent to `POST /message`.
///
/// The successful response body is a single JSON string: the envelope for
/// [`Message::Encrypt`], the recovered plaintext for [`Message::Decrypt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Message {
    /// Encrypt `plainText` under the session key.
    Encrypt {
        #[serde(rename = "plainText")]
        plain_text: String,
    },
    /// Decrypt an envelope produced by [`Message::Encrypt`].
    Decrypt {
        #[serde(rename = "cipherText")]
        cipher_text: String,
    },
}

impl Message {
    /// The `command` tag, for logging.
    pub fn command(&self) -> &'static str {
        match self {
            Message::Encrypt { .. } => "encrypt",
            Message::Decrypt { .. } => "decrypt",
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"decryption_failure"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the session key is loaded and ready.
    pub key_ready: bool,
}
