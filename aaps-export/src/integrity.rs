//! The `security.file_hash` integrity hash.
//!
//! AAPS hashes the whole export file with HMAC-SHA256 under a fixed key,
//! with the hash field itself holding a placeholder while the hash is
//! computed. On import it replaces the stored hash with the placeholder in
//! the raw file text and compares.

use crate::document::ExportDocument;
use crate::error::{ExportError, ExportResult};
use aaps_crypto::{hmac_sha256_hex, verify_hmac_sha256, FILE_HASH_KEY, FILE_HASH_PLACEHOLDER};

pub(crate) const FILE_HASH: &str = "security.file_hash";

/// Recomputes `security.file_hash` and returns the re-serialized export.
///
/// Applying this twice gives the same bytes both times.
pub fn compute_file_hash(export: &[u8]) -> ExportResult<Vec<u8>> {
    let mut doc = ExportDocument::parse(export)?;
    seal(&mut doc)
}

/// Checks the stored `security.file_hash` against the raw export bytes.
///
/// The bytes are not re-serialized, so this also validates files written by
/// AAPS itself.
pub fn verify_file_hash(export: &[u8]) -> ExportResult<bool> {
    let doc = ExportDocument::parse(export)?;
    let stored = doc.require_str(FILE_HASH)?;

    let text = std::str::from_utf8(export)
        .map_err(|e| ExportError::MalformedDocument(format!("export is not UTF-8: {e}")))?;
    let quoted_hash = serde_json::to_string(stored)?;
    let quoted_placeholder = serde_json::to_string(FILE_HASH_PLACEHOLDER)?;
    let unsigned = text.replace(&quoted_hash, &quoted_placeholder);

    // A stored hash that is not hex simply does not match.
    Ok(verify_hmac_sha256(FILE_HASH_KEY.as_bytes(), unsigned.as_bytes(), stored).unwrap_or(false))
}

/// Hashes `doc` in place and returns its final serialization.
pub(crate) fn seal(doc: &mut ExportDocument) -> ExportResult<Vec<u8>> {
    doc.set(FILE_HASH, FILE_HASH_PLACEHOLDER)?;
    let unsigned = doc.to_pretty_bytes()?;

    let hash = hmac_sha256_hex(FILE_HASH_KEY.as_bytes(), &unsigned);
    doc.set(FILE_HASH, hash)?;
    doc.to_pretty_bytes()
}
