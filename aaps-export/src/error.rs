//! Export transcoding error types.

use crate::transcode::DocumentState;
use aaps_crypto::CryptoError;
use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while reading or rewriting an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A field the requested operation needs is missing or has the wrong type.
    #[error("malformed export: {0}")]
    MalformedDocument(String),

    #[error("cannot {requested}: export is {from}")]
    InvalidStateTransition {
        from: DocumentState,
        requested: &'static str,
    },

    #[error("a password is required for encrypted exports")]
    PasswordRequired,

    #[error("unknown objective {0} (valid objectives are 1 to {max})", max = crate::objectives::OBJECTIVES.len())]
    UnknownObjective(u32),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    /// Whether this is the AES-GCM tag mismatch a wrong password produces.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::AuthenticationFailed))
    }
}
