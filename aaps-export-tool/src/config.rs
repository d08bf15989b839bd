//! Tool configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime settings for the command-line tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Suffix appended to the input file stem by `decrypt`.
    pub decrypted_suffix: String,

    /// Suffix appended to the input file stem by `encrypt`.
    pub encrypted_suffix: String,

    /// Suffix appended to the input file stem by `objectives`.
    pub objectives_suffix: String,

    /// `tracing` filter used when neither `RUST_LOG` nor `--verbose` is set.
    pub log_filter: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            decrypted_suffix: "_decrypted".to_string(),
            encrypted_suffix: "_encrypted".to_string(),
            objectives_suffix: "_objectives".to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

impl ToolConfig {
    /// Loads a TOML config file. Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// `<dir>/<stem><suffix>.<ext>` for an input path.
pub fn suffixed_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}
