//! Settings-export transcoding for AndroidAPS.
//!
//! An AAPS settings export is a JSON file whose `content` field holds the
//! app preferences and whose `security` object describes how they are
//! protected. This crate moves an export between its states:
//!
//! - encrypted (`aaps_encrypted`, base64 AES-256-GCM content)
//! - unencrypted with string preferences (`aaps_structured`, importable by AAPS)
//! - unencrypted with object preferences (convenient for manual editing)
//!
//! Every operation takes the export bytes and returns new bytes with a fresh
//! `security.file_hash`, so the output is always importable as far as the
//! integrity check is concerned. Fields this crate does not know about are
//! passed through in their original order.
//!
//! The `objectives` module edits the AAPS objective-completion preferences.

pub mod document;
pub mod error;
pub mod integrity;
pub mod objectives;
pub mod transcode;
pub mod workflow;

pub use document::ExportDocument;
pub use error::{ExportError, ExportResult};
pub use integrity::{compute_file_hash, verify_file_hash};
pub use objectives::{completed_objectives, objectives_by_number, Objective, OBJECTIVES};
pub use transcode::{
    classify, content_shape, preferences_to_object, preferences_to_string, to_encrypted,
    to_unencrypted, ContentShape, DocumentState, FORMAT_ENCRYPTED, FORMAT_STRUCTURED,
};
pub use workflow::{
    complete_objectives, decrypt_export, decrypt_preferences, encrypt_export,
    export_completed_objectives, preferences_plaintext, toggle_preferences,
};
