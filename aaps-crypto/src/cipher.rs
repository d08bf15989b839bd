//! AES-256-GCM encryption of export preferences.
//!
//! The key is derived from the password and salt on every call. Both the
//! derived key and the cipher's key schedule are zeroized on drop.

use crate::error::{CryptoError, CryptoResult};
use crate::frame::{decode_content, encode_content};
use crate::key::{derive_key, DerivedKey, Salt};
use crate::params::NONCE_SIZE;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::TryRngCore;

/// Encrypts `plaintext`, returning the base64 string stored in `content`.
pub fn encrypt(password: &[u8], salt: &Salt, plaintext: &[u8]) -> CryptoResult<String> {
    let key = derive_key(password, salt);

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Encryption(format!("nonce generation failed: {e}")))?;

    let ciphertext = cipher_for(&key)?
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    encode_content(&nonce, &ciphertext)
}

/// Decrypts the base64 `content` of an encrypted export.
///
/// The frame can carry any nonce length, but AAPS always writes 12-byte GCM
/// nonces, so anything else is rejected as [`CryptoError::MalformedFrame`]
/// before the cipher runs.
///
/// Fails with [`CryptoError::AuthenticationFailed`] when the tag does not
/// verify, which is what a wrong password looks like.
pub fn decrypt(password: &[u8], salt: &Salt, encoded_content: &str) -> CryptoResult<Vec<u8>> {
    let frame = decode_content(encoded_content)?;
    if frame.nonce.len() != NONCE_SIZE {
        return Err(CryptoError::MalformedFrame(format!(
            "expected a {NONCE_SIZE}-byte nonce, found {} bytes",
            frame.nonce.len()
        )));
    }

    let key = derive_key(password, salt);
    cipher_for(&key)?
        .decrypt(Nonce::from_slice(&frame.nonce), frame.ciphertext.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailed)
}

fn cipher_for(key: &DerivedKey) -> CryptoResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::KeyDerivation(format!("invalid key length: {e}")))
}
