//! AES-256-GCM encryption and decryption of text payloads.
//!
//! **Algorithm choice:** plain AES-256-GCM with a random 96-bit nonce per
//! call, matching the WebCrypto `AES-GCM` envelopes the extension exports.
//! Encryption is therefore non-deterministic: the same plaintext and key
//! give a different envelope every time.
//!
//! **Never reuse a nonce under the same key.** GCM nonce reuse breaks both
//! confidentiality and authentication.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Standard base64 that writes padding and accepts input with full, partial
/// or no padding.
///
/// Laxer than `atob`, which rejects a partial pad such as `AA=`. Here that
/// decodes to one byte and fails the nonce length check instead.
const ENVELOPE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A decoded envelope: the nonce and the authenticated ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode as `base64(nonce || ciphertext)`.
    pub fn encode(&self) -> String {
        let mut combined = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        combined.extend_from_slice(&self.nonce);
        combined.extend_from_slice(&self.ciphertext);
        ENVELOPE_ENGINE.encode(combined)
    }

    /// Parse envelope text back into its nonce and ciphertext.
    ///
    /// ASCII whitespace anywhere in the text is ignored, so envelope files
    /// with trailing newlines or line wrapping still parse.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidEncoding`] if the text is not base64,
    /// or [`CipherError::TooShort`] if fewer than [`NONCE_LEN`] bytes decode.
    pub fn decode(text: &str) -> Result<Self, CipherError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = ENVELOPE_ENGINE
            .decode(compact)
            .map_err(|_| CipherError::InvalidEncoding)?;
        if bytes.len() < NONCE_LEN {
            return Err(CipherError::TooShort(bytes.len()));
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// AES-GCM encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The envelope text is not valid base64.
    #[error("envelope is not valid base64")]
    InvalidEncoding,

    /// The decoded envelope cannot even hold a nonce.
    #[error("envelope decodes to {0} bytes, shorter than the {NONCE_LEN}-byte nonce")]
    TooShort(usize),

    /// Authenticated bytes did not decode as UTF-8 text.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Encrypt a text payload and return the encoded envelope.
///
/// A fresh 96-bit nonce is drawn from the OS CSPRNG on every call.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable with a valid key and nonce).
pub fn encrypt_text(plaintext: &str, key: &[u8]) -> Result<String, CipherError> {
    let cipher = build_cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| CipherError::AeadFailure)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce.as_slice());
    Ok(Envelope {
        nonce: nonce_bytes,
        ciphertext,
    }
    .encode())
}

/// Decrypt an encoded envelope back to its text payload.
///
/// Nothing is returned unless the authentication tag verifies.
///
/// # Errors
///
/// Returns [`CipherError::InvalidEncoding`] or [`CipherError::TooShort`] for
/// envelopes that cannot be parsed, [`CipherError::AeadFailure`] if
/// authentication fails (wrong key, tampered or truncated data), and
/// [`CipherError::InvalidUtf8`] if the payload is not text.
pub fn decrypt_text(envelope: &str, key: &[u8]) -> Result<String, CipherError> {
    let envelope = Envelope::decode(envelope)?;
    let cipher = build_cipher(key)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| CipherError::AeadFailure)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength);
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> Vec<u8> {
        Aes256Gcm::generate_key(OsRng).to_vec()
    }

    fn raw(envelope: &str) -> Vec<u8> {
        ENVELOPE_ENGINE.decode(envelope).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = random_key();
        for plaintext in ["", "hello", "héllo wörld ✓ 🦀", r#"["https://a.example"]"#] {
            let envelope = encrypt_text(plaintext, &key).unwrap();
            assert_eq!(decrypt_text(&envelope, &key).unwrap(), plaintext);
        }
    }

    #[test]
    fn envelope_layout_is_nonce_ciphertext_tag() {
        let key = random_key();
        let envelope = encrypt_text("abc", &key).unwrap();
        assert_eq!(raw(&envelope).len(), NONCE_LEN + 3 + TAG_LEN);
        assert!(envelope.ends_with('='), "expected padded output: {envelope}");
    }

    #[test]
    fn same_plaintext_gives_different_envelopes() {
        let key = random_key();
        let a = encrypt_text("same", &key).unwrap();
        let b = encrypt_text("same", &key).unwrap();
        assert_ne!(a, b);
        assert_ne!(raw(&a)[..NONCE_LEN], raw(&b)[..NONCE_LEN]);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let envelope = encrypt_text("secret", &random_key()).unwrap();
        assert!(matches!(
            decrypt_text(&envelope, &random_key()),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn invalid_key_length_rejected() {
        assert!(matches!(
            encrypt_text("x", &[0u8; 16]),
            Err(CipherError::InvalidKeyLength)
        ));
    }

    #[test]
    fn every_tampered_byte_fails_auth() {
        let key = random_key();
        let envelope = encrypt_text("tamper me", &key).unwrap();
        let bytes = raw(&envelope);
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            let text = ENVELOPE_ENGINE.encode(&tampered);
            assert!(
                matches!(decrypt_text(&text, &key), Err(CipherError::AeadFailure)),
                "byte {i} flip was not detected"
            );
        }
    }

    #[test]
    fn truncated_ciphertext_fails_auth() {
        let key = random_key();
        let envelope = encrypt_text("truncate me", &key).unwrap();
        let bytes = raw(&envelope);
        let text = ENVELOPE_ENGINE.encode(&bytes[..bytes.len() - 1]);
        assert!(matches!(
            decrypt_text(&text, &key),
            Err(CipherError::AeadFailure)
        ));
        // Nonce only, no tag at all.
        let text = ENVELOPE_ENGINE.encode(&bytes[..NONCE_LEN]);
        assert!(matches!(
            decrypt_text(&text, &key),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn short_envelope_rejected_before_decryption() {
        let text = ENVELOPE_ENGINE.encode([0u8; NONCE_LEN - 1]);
        assert!(matches!(Envelope::decode(&text), Err(CipherError::TooShort(11))));
        assert!(matches!(Envelope::decode(""), Err(CipherError::TooShort(0))));
    }

    #[test]
    fn bad_base64_rejected() {
        assert!(matches!(
            Envelope::decode("!!!not base64!!!"),
            Err(CipherError::InvalidEncoding)
        ));
    }

    #[test]
    fn whitespace_and_missing_padding_tolerated() {
        let key = random_key();
        let envelope = encrypt_text("wrapped", &key).unwrap();
        let unpadded = envelope.trim_end_matches('=');
        let (head, tail) = unpadded.split_at(10);
        let wrapped = format!("  {head}\n{tail}\r\n");
        assert_eq!(decrypt_text(&wrapped, &key).unwrap(), "wrapped");
    }

    #[test]
    fn partial_padding_is_decoded_then_length_checked() {
        assert!(matches!(Envelope::decode("AA="), Err(CipherError::TooShort(1))));
        assert!(matches!(Envelope::decode("AA"), Err(CipherError::TooShort(1))));

        // 12 + 0 + 16 bytes encode with a double pad; one pad is enough.
        let key = random_key();
        let envelope = encrypt_text("", &key).unwrap();
        assert!(envelope.ends_with("=="), "{envelope}");
        let half_padded = &envelope[..envelope.len() - 1];
        assert_eq!(decrypt_text(half_padded, &key).unwrap(), "");
    }

    #[test]
    fn non_utf8_payload_rejected() {
        let key = random_key();
        let cipher = build_cipher(&key).unwrap();
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher.encrypt(&nonce, &[0xFFu8, 0xFE][..]).unwrap();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce.as_slice());
        let text = Envelope {
            nonce: nonce_bytes,
            ciphertext,
        }
        .encode();
        assert!(matches!(
            decrypt_text(&text, &key),
            Err(CipherError::InvalidUtf8)
        ));
    }
}
