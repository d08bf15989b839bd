use aaps_crypto::CryptoError;
use aaps_export::{DocumentState, ExportError};

#[test]
fn malformed_document_display() {
    let err = ExportError::MalformedDocument("missing `content` field".into());
    assert_eq!(err.to_string(), "malformed export: missing `content` field");
}

#[test]
fn invalid_transition_display() {
    let err = ExportError::InvalidStateTransition {
        from: DocumentState::Unencrypted,
        requested: "decrypt",
    };
    assert_eq!(err.to_string(), "cannot decrypt: export is not encrypted");
}

#[test]
fn unknown_objective_display() {
    let err = ExportError::UnknownObjective(12);
    assert_eq!(
        err.to_string(),
        "unknown objective 12 (valid objectives are 1 to 10)"
    );
}

#[test]
fn password_required_display() {
    assert_eq!(
        ExportError::PasswordRequired.to_string(),
        "a password is required for encrypted exports"
    );
}

#[test]
fn authentication_failure_is_distinguishable() {
    let err: ExportError = CryptoError::AuthenticationFailed.into();
    assert!(err.is_authentication_failure());

    let err: ExportError = CryptoError::MalformedFrame("empty payload".into()).into();
    assert!(!err.is_authentication_failure());
    assert_eq!(err.to_string(), "crypto error: malformed content frame: empty payload");
}

#[test]
fn from_serde_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
    let err: ExportError = json_err.into();
    assert!(err.to_string().contains("serialization error"));
}
