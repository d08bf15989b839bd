//! Codec error types.

use thiserror::Error;

/// Result type for codec operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while deriving keys, framing or running the AEAD.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Entropy source or KDF parameter failure.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The decoded `content` payload does not follow the nonce framing.
    #[error("malformed content frame: {0}")]
    MalformedFrame(String),

    #[error("content is not valid base64: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// AES-GCM tag mismatch: wrong password, wrong salt or tampered content.
    #[error("authentication failed (wrong password or corrupted content)")]
    AuthenticationFailed,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
