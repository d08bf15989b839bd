//! Nonce framing used inside the `content` field of encrypted exports.
//!
//! ```text
//! byte 0         nonce length N
//! bytes 1..1+N   nonce
//! bytes 1+N..    ciphertext (authentication tag included)
//! ```
//!
//! The framed bytes are stored as standard (padded, non URL-safe) base64.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// A decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Prefixes `ciphertext` with the length-tagged `nonce`.
pub fn encode_frame(nonce: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    let nonce_len = u8::try_from(nonce.len()).map_err(|_| {
        CryptoError::MalformedFrame(format!(
            "nonce of {} bytes does not fit a one-byte length prefix",
            nonce.len()
        ))
    })?;

    let mut out = Vec::with_capacity(1 + nonce.len() + ciphertext.len());
    out.push(nonce_len);
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    Ok(out)
}

/// Splits a framed blob into nonce and ciphertext.
pub fn decode_frame(blob: &[u8]) -> CryptoResult<Frame> {
    let (&nonce_len, rest) = blob
        .split_first()
        .ok_or_else(|| CryptoError::MalformedFrame("empty payload".to_string()))?;

    let nonce_len = usize::from(nonce_len);
    if rest.len() < nonce_len {
        return Err(CryptoError::MalformedFrame(format!(
            "nonce length {nonce_len} exceeds remaining {} bytes",
            rest.len()
        )));
    }

    let (nonce, ciphertext) = rest.split_at(nonce_len);
    Ok(Frame {
        nonce: nonce.to_vec(),
        ciphertext: ciphertext.to_vec(),
    })
}

/// Frames and base64-encodes, producing the string stored in `content`.
pub fn encode_content(nonce: &[u8], ciphertext: &[u8]) -> CryptoResult<String> {
    Ok(STANDARD.encode(encode_frame(nonce, ciphertext)?))
}

/// Reverses [`encode_content`].
pub fn decode_content(content: &str) -> CryptoResult<Frame> {
    let blob = STANDARD.decode(content)?;
    decode_frame(&blob)
}
