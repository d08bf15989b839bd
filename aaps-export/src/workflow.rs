//! End-to-end operations on export files.
//!
//! Each function takes the bytes of an export and returns the bytes to write.
//! Keys are derived inside `aaps_crypto` per call, so re-encrypting with a
//! new salt never reuses the key that decrypted the input.

use crate::document::ExportDocument;
use crate::error::{ExportError, ExportResult};
use crate::integrity::seal;
use crate::objectives::{completed_objectives, Objective};
use crate::transcode::{ContentShape, DocumentState, CONTENT, SALT};
use aaps_crypto::{sha256_hex, Salt};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// The preferences of an unencrypted export as text.
///
/// String content is returned as-is; object content is serialized compactly.
pub fn preferences_plaintext(export: &[u8]) -> ExportResult<String> {
    plaintext_of(&ExportDocument::parse(export)?)
}

fn plaintext_of(doc: &ExportDocument) -> ExportResult<String> {
    doc.content_shape()?;
    match doc.get(CONTENT) {
        Some(Value::String(text)) => Ok(text.clone()),
        prefs => Ok(serde_json::to_string(&prefs)?),
    }
}

/// Decrypts the preferences of an encrypted export.
///
/// A malformed `security.salt` is a hard error rather than an empty salt.
pub fn decrypt_preferences(export: &[u8], password: &str) -> ExportResult<Vec<u8>> {
    let doc = ExportDocument::parse(export)?;
    if doc.state() != DocumentState::Encrypted {
        return Err(ExportError::InvalidStateTransition {
            from: doc.state(),
            requested: "decrypt",
        });
    }

    let salt = Salt::from_hex(doc.require_str(SALT)?).map_err(|e| {
        ExportError::MalformedDocument(format!("`security.salt` is not valid hex: {e}"))
    })?;
    let content = doc.require_str(CONTENT)?;

    debug!(salt_len = salt.len(), content_len = content.len(), "decrypting preferences");
    Ok(aaps_crypto::decrypt(password.as_bytes(), &salt, content)?)
}

/// Decrypts an export into the `aaps_structured` format with string preferences.
pub fn decrypt_export(export: &[u8], password: &str) -> ExportResult<Vec<u8>> {
    let plaintext = decrypt_preferences(export, password)?;
    crate::transcode::to_unencrypted(export, &plaintext)
}

/// Encrypts an unencrypted export.
///
/// A fresh random salt is used unless `salt` is given.
pub fn encrypt_export(export: &[u8], password: &str, salt: Option<Salt>) -> ExportResult<Vec<u8>> {
    let mut doc = ExportDocument::parse(export)?;
    encrypt_document(&mut doc, password, salt)
}

fn encrypt_document(
    doc: &mut ExportDocument,
    password: &str,
    salt: Option<Salt>,
) -> ExportResult<Vec<u8>> {
    if doc.state() != DocumentState::Unencrypted {
        return Err(ExportError::InvalidStateTransition {
            from: doc.state(),
            requested: "encrypt",
        });
    }

    let plaintext = plaintext_of(doc)?;
    let salt = match salt {
        Some(salt) => salt,
        None => Salt::random()?,
    };

    debug!(salt_len = salt.len(), plaintext_len = plaintext.len(), "encrypting preferences");
    let ciphertext = aaps_crypto::encrypt(password.as_bytes(), &salt, plaintext.as_bytes())?;
    doc.mark_encrypted(&salt, &ciphertext, &sha256_hex(plaintext.as_bytes()))?;
    seal(doc)
}

/// Switches the preferences between string and object storage.
///
/// Returns the converted export and the shape the preferences now have.
pub fn toggle_preferences(export: &[u8]) -> ExportResult<(Vec<u8>, ContentShape)> {
    let mut doc = ExportDocument::parse(export)?;
    let target = match doc.content_shape()? {
        ContentShape::Object => {
            doc.embed_preferences_string()?;
            ContentShape::String
        }
        ContentShape::String => {
            doc.embed_preferences_object()?;
            ContentShape::Object
        }
    };
    Ok((seal(&mut doc)?, target))
}

/// Reads which objectives an export records as completed.
pub fn export_completed_objectives(
    export: &[u8],
    password: Option<&str>,
    now: DateTime<Utc>,
) -> ExportResult<Vec<u32>> {
    let (doc, _) = open_for_editing(export, password)?;
    Ok(completed_objectives(&preferences_map(&doc)?, now))
}

/// Marks `objectives` as completed in an export.
///
/// Encrypted exports are decrypted with `password` and re-encrypted under a
/// fresh salt. Unencrypted exports keep their preference storage shape.
pub fn complete_objectives(
    export: &[u8],
    password: Option<&str>,
    objectives: &[&Objective],
    now: DateTime<Utc>,
) -> ExportResult<Vec<u8>> {
    let (mut doc, origin) = open_for_editing(export, password)?;

    let mut prefs = preferences_map(&doc)?;
    for objective in objectives {
        objective.complete(&mut prefs, now)?;
        info!(number = objective.number, name = objective.name, "objective marked as completed");
    }
    doc.set(CONTENT, Value::Object(prefs))?;

    match origin {
        Origin::Encrypted { password } => {
            doc.embed_preferences_string()?;
            encrypt_document(&mut doc, password, None)
        }
        Origin::Unencrypted(ContentShape::Object) => seal(&mut doc),
        Origin::Unencrypted(ContentShape::String) => {
            doc.embed_preferences_string()?;
            seal(&mut doc)
        }
    }
}

/// How an export looked before it was opened for editing.
enum Origin<'a> {
    Encrypted { password: &'a str },
    Unencrypted(ContentShape),
}

/// Decrypts the export if needed, returning an unencrypted document.
fn open_for_editing<'a>(
    export: &[u8],
    password: Option<&'a str>,
) -> ExportResult<(ExportDocument, Origin<'a>)> {
    let doc = ExportDocument::parse(export)?;
    match doc.state() {
        DocumentState::Encrypted => {
            let password = password.ok_or(ExportError::PasswordRequired)?;
            let unencrypted = decrypt_export(export, password)?;
            Ok((ExportDocument::parse(&unencrypted)?, Origin::Encrypted { password }))
        }
        DocumentState::Unencrypted => {
            let shape = doc.content_shape()?;
            Ok((doc, Origin::Unencrypted(shape)))
        }
    }
}

fn preferences_map(doc: &ExportDocument) -> ExportResult<Map<String, Value>> {
    match doc.get(CONTENT) {
        Some(Value::Object(prefs)) => Ok(prefs.clone()),
        Some(Value::String(text)) => match serde_json::from_str(text)? {
            Value::Object(prefs) => Ok(prefs),
            _ => Err(ExportError::MalformedDocument(
                "preferences must be a JSON object".to_string(),
            )),
        },
        _ => Err(ExportError::MalformedDocument(
            "missing `content` field".to_string(),
        )),
    }
}
