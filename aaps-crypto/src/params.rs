//! Fixed parameters shared with AndroidAPS.
//!
//! Every value here must match `CryptoUtil.kt` and `EncryptedPrefsFormat.kt`
//! in AAPS, otherwise exports produced by this crate can no longer be imported.

/// AES-GCM nonce ("IV" in AAPS) length in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag length in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Length of freshly generated salts in bytes.
pub const SALT_SIZE: usize = 32;

/// PBKDF2-HMAC-SHA1 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 50_000;

/// HMAC-SHA256 key for `security.file_hash` ("KEY_CONSCIENCE" in AAPS).
pub const FILE_HASH_KEY: &str =
    "if you remove/change this, please make sure you know the consequences!";

/// Value `security.file_hash` holds while the file hash is being computed.
pub const FILE_HASH_PLACEHOLDER: &str = "--to-be-calculated--";
