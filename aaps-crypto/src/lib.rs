//! Encryption layer for AndroidAPS settings exports.
//!
//! Reproduces the scheme AAPS uses for the `content` field of an
//! `aaps_encrypted` export:
//! - PBKDF2-HMAC-SHA1 (50 000 rounds) for key derivation from the master password
//! - AES-256-GCM with a 12-byte nonce and a 128-bit tag
//! - A one-byte nonce-length header in front of the ciphertext, base64-encoded
//!
//! # Key handling
//!
//! The AES key is derived from the password and the export's salt inside
//! every [`encrypt`] / [`decrypt`] call and zeroized when the call returns.
//! Re-encrypting an export therefore derives a second key from the new salt
//! instead of reusing the first one.
//!
//! The file hash helpers in [`hash`] cover the two digests an export carries:
//! the SHA-256 `content_hash` and the HMAC-SHA256 `file_hash`.

mod cipher;
mod error;
pub mod frame;
pub mod hash;
mod key;
pub mod params;

pub use cipher::{decrypt, encrypt};
pub use error::{CryptoError, CryptoResult};
pub use frame::{decode_content, decode_frame, encode_content, encode_frame, Frame};
pub use hash::{hmac_sha256_hex, sha256_hex, verify_hmac_sha256};
pub use key::{derive_key, DerivedKey, Salt};
pub use params::{
    FILE_HASH_KEY, FILE_HASH_PLACEHOLDER, KEY_SIZE, NONCE_SIZE, PBKDF2_ITERATIONS, SALT_SIZE,
    TAG_SIZE,
};
