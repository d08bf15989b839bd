#![allow(dead_code)]

use serde_json::{json, Value};

pub const PASSWORD: &str = "correct-horse";

/// Preferences as AAPS stores them: every value is a string.
pub fn preferences() -> Value {
    json!({
        "units": "mg/dl",
        "language": "en",
        "Objectives_config_started": "0",
        "Objectives_config_accomplished": "0",
        "key_treatmentssafety_maxbolus": "3.0"
    })
}

/// An unencrypted export with string preferences, as written by AAPS.
pub fn structured_export() -> Vec<u8> {
    let export = json!({
        "metadata": {
            "device_name": {"value": "Pixel 7", "info": "Device name"},
            "created_at": {"value": "2024-03-01T12:00:00Z", "info": "Created at"},
            "aaps_version": {"value": "3.2.0.4", "info": "AAPS version"},
            "aaps_flavour": {"value": "full", "info": "AAPS flavour"},
            "device_model": {"value": "Google Pixel 7", "info": "Device model"},
            "encryption": {"value": "Unencrypted", "info": "Encryption"}
        },
        "format": "aaps_structured",
        "security": {
            "file_hash": "--to-be-calculated--",
            "algorithm": "none"
        },
        "content": preferences().to_string()
    });
    let bytes = serde_json::to_vec_pretty(&export).unwrap();
    aaps_export::compute_file_hash(&bytes).unwrap()
}

pub fn parse(bytes: &[u8]) -> aaps_export::ExportDocument {
    aaps_export::ExportDocument::parse(bytes).unwrap()
}
