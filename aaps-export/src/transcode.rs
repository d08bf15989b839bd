//! State transitions of an export's envelope.
//!
//! An export is either encrypted (`format = aaps_encrypted`) or not, and an
//! unencrypted export stores its preferences either as a JSON string (the
//! form AAPS imports) or as a JSON object (the form people edit). Every
//! byte-level transition below ends by recomputing `security.file_hash`.

use crate::document::{type_name, ExportDocument};
use crate::error::{ExportError, ExportResult};
use crate::integrity::seal;
use aaps_crypto::Salt;
use serde_json::Value;
use std::fmt;

pub const FORMAT_ENCRYPTED: &str = "aaps_encrypted";
pub const FORMAT_STRUCTURED: &str = "aaps_structured";

pub const ALGORITHM_NONE: &str = "none";
pub const ALGORITHM_V1: &str = "v1";

pub(crate) const FORMAT: &str = "format";
pub(crate) const CONTENT: &str = "content";
pub(crate) const SALT: &str = "security.salt";
pub(crate) const ALGORITHM: &str = "security.algorithm";
pub(crate) const CONTENT_HASH: &str = "security.content_hash";

/// Whether the preferences are encrypted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentState {
    Encrypted,
    /// `aaps_structured` or any format this tool does not recognize.
    Unencrypted,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypted => f.write_str("encrypted"),
            Self::Unencrypted => f.write_str("not encrypted"),
        }
    }
}

/// JSON type of the `content` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentShape {
    String,
    Object,
}

impl fmt::Display for ContentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Object => f.write_str("JSON object"),
        }
    }
}

impl ExportDocument {
    pub fn state(&self) -> DocumentState {
        if self.get_str(FORMAT) == Some(FORMAT_ENCRYPTED) {
            DocumentState::Encrypted
        } else {
            DocumentState::Unencrypted
        }
    }

    pub fn content_shape(&self) -> ExportResult<ContentShape> {
        match self.get(CONTENT) {
            Some(Value::String(_)) => Ok(ContentShape::String),
            Some(Value::Object(_)) => Ok(ContentShape::Object),
            Some(other) => Err(ExportError::MalformedDocument(format!(
                "`content` must be a string or an object, found {}",
                type_name(other)
            ))),
            None => Err(ExportError::MalformedDocument(
                "missing `content` field".to_string(),
            )),
        }
    }

    fn expect_state(&self, wanted: DocumentState, requested: &'static str) -> ExportResult<()> {
        let from = self.state();
        if from == wanted {
            Ok(())
        } else {
            Err(ExportError::InvalidStateTransition { from, requested })
        }
    }

    /// Rewrites the envelope of an encrypted export around `plaintext`.
    pub fn mark_unencrypted(&mut self, plaintext: &str) -> ExportResult<()> {
        self.expect_state(DocumentState::Encrypted, "convert to unencrypted format")?;

        self.set(FORMAT, FORMAT_STRUCTURED)?;
        self.set(crate::integrity::FILE_HASH, aaps_crypto::FILE_HASH_PLACEHOLDER)?;
        self.set(ALGORITHM, ALGORITHM_NONE)?;
        self.set(CONTENT, plaintext)?;
        self.remove(SALT);
        self.remove(CONTENT_HASH);
        Ok(())
    }

    /// Rewrites the envelope of an unencrypted export around encrypted content.
    pub fn mark_encrypted(
        &mut self,
        salt: &Salt,
        ciphertext_b64: &str,
        content_hash_hex: &str,
    ) -> ExportResult<()> {
        self.expect_state(DocumentState::Unencrypted, "convert to encrypted format")?;

        self.set(FORMAT, FORMAT_ENCRYPTED)?;
        self.set(crate::integrity::FILE_HASH, aaps_crypto::FILE_HASH_PLACEHOLDER)?;
        self.set(ALGORITHM, ALGORITHM_V1)?;
        self.set(SALT, salt.to_hex())?;
        self.set(CONTENT_HASH, content_hash_hex)?;
        self.set(CONTENT, ciphertext_b64)?;
        Ok(())
    }

    /// Parses string `content` into a JSON object. Object content is left alone.
    pub fn embed_preferences_object(&mut self) -> ExportResult<()> {
        self.expect_state(DocumentState::Unencrypted, "convert preferences to an object")?;

        if self.content_shape()? == ContentShape::String {
            let parsed: Value = serde_json::from_str(self.require_str(CONTENT)?)?;
            if !parsed.is_object() {
                return Err(ExportError::MalformedDocument(format!(
                    "preferences must be a JSON object, found {}",
                    type_name(&parsed)
                )));
            }
            self.set(CONTENT, parsed)?;
        }
        Ok(())
    }

    /// Serializes object `content` into a compact JSON string. String content is left alone.
    pub fn embed_preferences_string(&mut self) -> ExportResult<()> {
        self.expect_state(DocumentState::Unencrypted, "convert preferences to a string")?;

        self.content_shape()?;
        if let Some(prefs @ Value::Object(_)) = self.get(CONTENT) {
            let compact = serde_json::to_string(prefs)?;
            self.set(CONTENT, compact)?;
        }
        Ok(())
    }
}

/// Reads `format` and reports whether the export is encrypted.
pub fn classify(export: &[u8]) -> ExportResult<DocumentState> {
    Ok(ExportDocument::parse(export)?.state())
}

/// Reports whether `content` is a string or an object.
pub fn content_shape(export: &[u8]) -> ExportResult<ContentShape> {
    ExportDocument::parse(export)?.content_shape()
}

/// Replaces the encrypted envelope with an `aaps_structured` one holding `plaintext`.
///
/// `plaintext` is the output of [`aaps_crypto::decrypt`] and must be UTF-8.
pub fn to_unencrypted(export: &[u8], plaintext: &[u8]) -> ExportResult<Vec<u8>> {
    let plaintext = std::str::from_utf8(plaintext).map_err(|e| {
        ExportError::MalformedDocument(format!("decrypted preferences are not UTF-8: {e}"))
    })?;

    let mut doc = ExportDocument::parse(export)?;
    doc.mark_unencrypted(plaintext)?;
    seal(&mut doc)
}

/// Wraps already encrypted content in an `aaps_encrypted` envelope.
pub fn to_encrypted(
    export: &[u8],
    salt: &Salt,
    ciphertext_b64: &str,
    content_hash_hex: &str,
) -> ExportResult<Vec<u8>> {
    let mut doc = ExportDocument::parse(export)?;
    doc.mark_encrypted(salt, ciphertext_b64, content_hash_hex)?;
    seal(&mut doc)
}

/// Stores the preferences as a JSON object for manual editing.
pub fn preferences_to_object(export: &[u8]) -> ExportResult<Vec<u8>> {
    let mut doc = ExportDocument::parse(export)?;
    doc.embed_preferences_object()?;
    seal(&mut doc)
}

/// Stores the preferences as a JSON string, the form AAPS imports.
pub fn preferences_to_string(export: &[u8]) -> ExportResult<Vec<u8>> {
    let mut doc = ExportDocument::parse(export)?;
    doc.embed_preferences_string()?;
    seal(&mut doc)
}
