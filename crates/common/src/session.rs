//! Tab session payloads: the plaintext that travels inside an envelope.
//!
//! A session is a JSON array of URL strings, serialised compactly so the
//! bytes match what the extension popup produces.

use thiserror::Error;

/// File name suggested when saving an exported session.
pub const DEFAULT_EXPORT_FILENAME: &str = "my_tabs_encrypted.json";

/// Errors raised while interpreting a decrypted session payload.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The payload is not valid JSON, or the array holds non-string items.
    #[error("session payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload is valid JSON but not an array of URLs.
    #[error("decrypted data is not an array of URLs")]
    NotAnArray,
}

/// Serialise a list of tab URLs to the compact JSON payload.
pub fn encode_urls(urls: &[String]) -> String {
    // A slice of strings always serialises.
    serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_owned())
}

/// Parse a decrypted payload back into tab URLs.
///
/// # Errors
///
/// Returns [`SessionError::NotAnArray`] if the document is not a JSON array,
/// or [`SessionError::InvalidJson`] if it cannot be parsed as an array of
/// strings.
pub fn decode_urls(payload: &str) -> Result<Vec<String>, SessionError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if !value.is_array() {
        return Err(SessionError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}
