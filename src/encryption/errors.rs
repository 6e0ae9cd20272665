//! # Encryption Errors
//!
//! Error types for field-level encryption.

use thiserror::Error;

/// Result type for encryption operations
pub type EncryptionResult<T> = Result<T, EncryptionError>;

/// Encryption and decryption errors.
///
/// Decryption fails closed: tampered ciphertext or a wrong key raises,
/// never returns garbage or a default.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The cipher rejected the plaintext
    #[error("encryption failed")]
    Encrypt,

    /// Stored form is not valid base64 or is too short to hold a nonce
    #[error("malformed ciphertext")]
    MalformedCiphertext,

    /// Authentication failed: ciphertext tampered with or wrong key
    #[error("decryption failed: ciphertext tampered with or wrong key")]
    Decrypt,

    /// Decrypted payload is not the JSON the encryptor wrote
    #[error("encrypted payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
