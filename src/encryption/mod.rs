//! Field-level authenticated encryption.
//!
//! Encrypted fields are stored as XChaCha20-Poly1305 ciphertext over the
//! JSON-encoded value, base64-encoded so the cell stays a plain string. The
//! stored form is self-contained: a random 24-byte nonce is prepended to the
//! ciphertext before encoding, and the Poly1305 tag makes tampering or a
//! wrong key a hard failure.
//!
//! # Key persistence
//!
//! When no key is supplied, a random one is generated. It is retrievable via
//! [`Encryptor::key_base64`] and the caller MUST persist it: without it,
//! previously written ciphertext is unrecoverable.

mod errors;

pub use errors::{EncryptionError, EncryptionResult};

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::Value as Json;
use sha2::{Digest, Sha256};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;

/// Symmetric authenticated encryption for individual field values
pub struct Encryptor {
    cipher: XChaCha20Poly1305,
    key: [u8; KEY_LEN],
}

impl Encryptor {
    /// Creates an encryptor from an optional caller-supplied key.
    ///
    /// A key that base64-decodes to exactly 32 bytes is used directly; any
    /// other passphrase is derived deterministically through SHA-256, so
    /// arbitrary-length passphrases are never rejected. With no key, a
    /// random one is generated; see the module docs on persisting it.
    pub fn new(key: Option<&str>) -> Self {
        let key = match key {
            Some(k) => derive_key(k),
            None => {
                let mut bytes = [0u8; KEY_LEN];
                OsRng.fill_bytes(&mut bytes);
                bytes
            }
        };
        Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(&key)),
            key,
        }
    }

    /// The key in base64 form, suitable for persisting and passing back to
    /// [`Encryptor::new`].
    pub fn key_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.key)
    }

    /// Encrypts a JSON-serializable value into a self-contained string.
    pub fn encrypt(&self, value: &Json) -> EncryptionResult<String> {
        let plaintext = serde_json::to_vec(value)?;
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| EncryptionError::Encrypt)?;
        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(framed))
    }

    /// Decrypts a stored string back to its JSON value.
    ///
    /// An empty input decodes to `Json::Null` (absent cell), not an error.
    ///
    /// # Errors
    ///
    /// Returns `EncryptionError` on malformed base64, a truncated frame,
    /// authentication failure (tamper or wrong key), or a payload that is
    /// not valid JSON.
    pub fn decrypt(&self, stored: &str) -> EncryptionResult<Json> {
        if stored.is_empty() {
            return Ok(Json::Null);
        }
        let framed = URL_SAFE_NO_PAD
            .decode(stored)
            .map_err(|_| EncryptionError::MalformedCiphertext)?;
        if framed.len() < NONCE_LEN {
            return Err(EncryptionError::MalformedCiphertext);
        }
        let (nonce, ciphertext) = framed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| EncryptionError::Decrypt)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

/// Derives a 32-byte key from a caller-supplied string.
fn derive_key(key: &str) -> [u8; KEY_LEN] {
    for engine in [&URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD] {
        if let Ok(bytes) = engine.decode(key) {
            if bytes.len() == KEY_LEN {
                let mut out = [0u8; KEY_LEN];
                out.copy_from_slice(&bytes);
                return out;
            }
        }
    }
    Sha256::digest(key.as_bytes()).into()
}
