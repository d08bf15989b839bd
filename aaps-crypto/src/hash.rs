//! Digest helpers for `security.content_hash` and `security.file_hash`.

use crate::error::CryptoResult;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Lowercase hex HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    hex::encode(keyed(key, message).finalize().into_bytes())
}

/// Checks a hex HMAC-SHA256 tag in constant time.
///
/// Returns `Ok(false)` on mismatch and an error only when `expected_hex` is not hex.
pub fn verify_hmac_sha256(key: &[u8], message: &[u8], expected_hex: &str) -> CryptoResult<bool> {
    let expected = hex::decode(expected_hex)?;
    Ok(keyed(key, message).verify_slice(&expected).is_ok())
}

fn keyed(key: &[u8], message: &[u8]) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    mac
}
