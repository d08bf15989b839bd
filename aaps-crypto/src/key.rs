//! Password-based key derivation.
//!
//! AAPS stretches the master password with PBKDF2-HMAC-SHA1. The hash and
//! iteration count are fixed by the export format, not chosen here.

use crate::error::{CryptoError, CryptoResult};
use crate::params::{KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};
use rand::TryRngCore;
use sha1::Sha1;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 256-bit AES key derived from a password.
///
/// Zeroized when dropped. Never stored; derived again for every operation.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Salt mixed into key derivation and stored hex-encoded in `security.salt`.
///
/// Generated salts are [`SALT_SIZE`] bytes. Salts read from an export are
/// taken as-is, whatever their length.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Draws a fresh salt from the operating system's CSPRNG.
    pub fn random() -> CryptoResult<Self> {
        let mut bytes = vec![0u8; SALT_SIZE];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::KeyDerivation(format!("salt generation failed: {e}")))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parses the hex form stored in `security.salt`.
    pub fn from_hex(hex_salt: &str) -> CryptoResult<Self> {
        Ok(Self(hex::decode(hex_salt)?))
    }

    /// Lowercase hex, as written to `security.salt`.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt({})", self.to_hex())
    }
}

/// Derives the AES key for `password` and `salt`.
///
/// Empty passwords and salts are accepted; PBKDF2 itself does not reject them.
pub fn derive_key(password: &[u8], salt: &Salt) -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    stretch(password, salt.as_bytes(), PBKDF2_ITERATIONS, &mut bytes);
    let key = DerivedKey::from_bytes(bytes);
    bytes.zeroize();
    key
}

fn stretch(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
    pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, rounds, out);
}
