//! Command handlers.

use crate::config::{suffixed_path, ToolConfig};
use crate::prompt::{resolve_password, select_objectives};
use aaps_crypto::Salt;
use aaps_export::{
    classify, complete_objectives, compute_file_hash, decrypt_export, decrypt_preferences,
    encrypt_export, export_completed_objectives, objectives_by_number, preferences_to_object,
    toggle_preferences, verify_file_hash, DocumentState,
};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a command writes its result.
pub enum Target {
    Console,
    /// A file; `None` picks the command's default path.
    File(Option<PathBuf>),
}

/// What `decrypt` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptMode {
    /// An `aaps_structured` export with string preferences.
    Export,
    /// An `aaps_structured` export with object preferences.
    ExportWithObject,
    /// Only the decrypted preferences, byte for byte.
    PreferencesOnly,
}

impl DecryptMode {
    pub fn from_flags(preferences_object: bool, only_preferences: bool) -> Self {
        match (preferences_object, only_preferences) {
            (_, true) => Self::PreferencesOnly,
            (true, false) => Self::ExportWithObject,
            (false, false) => Self::Export,
        }
    }
}

fn read_export(file: &Path) -> Result<Vec<u8>> {
    std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))
}

/// Writes `bytes` to the target. Returns the absolute path for file targets.
fn emit(target: Target, default: PathBuf, bytes: &[u8]) -> Result<Option<PathBuf>> {
    match target {
        Target::Console => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(None)
        }
        Target::File(path) => {
            let path = path.unwrap_or(default);
            std::fs::write(&path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), len = bytes.len(), "output written");
            Ok(Some(std::path::absolute(&path)?))
        }
    }
}

pub fn decrypt(
    config: &ToolConfig,
    file: &Path,
    password: Option<String>,
    target: Target,
    mode: DecryptMode,
) -> Result<()> {
    let export = read_export(file)?;
    if classify(&export)? == DocumentState::Unencrypted {
        println!("Cannot decrypt: input file is already decrypted");
        return Ok(());
    }

    let password = resolve_password(password)?;
    let output = match mode {
        DecryptMode::Export => decrypt_export(&export, &password)?,
        DecryptMode::ExportWithObject => {
            preferences_to_object(&decrypt_export(&export, &password)?)?
        }
        DecryptMode::PreferencesOnly => decrypt_preferences(&export, &password)?,
    };

    let default = suffixed_path(file, &config.decrypted_suffix);
    if let Some(path) = emit(target, default, &output)? {
        println!("Decrypted settings were exported to {:?}", path.display().to_string());
    }
    Ok(())
}

pub fn encrypt(
    config: &ToolConfig,
    file: &Path,
    password: Option<String>,
    target: Target,
    salt: Option<String>,
) -> Result<()> {
    let export = read_export(file)?;
    if classify(&export)? == DocumentState::Encrypted {
        println!("Cannot encrypt: input file is already encrypted");
        return Ok(());
    }

    let salt = salt
        .map(|hex| Salt::from_hex(&hex).context("salt must be a hex string"))
        .transpose()?;
    let password = resolve_password(password)?;
    let output = encrypt_export(&export, &password, salt)?;

    let default = suffixed_path(file, &config.encrypted_suffix);
    if let Some(path) = emit(target, default, &output)? {
        println!("Encrypted settings were exported to {:?}", path.display().to_string());
    }
    Ok(())
}

pub fn format(file: &Path, target: Target) -> Result<()> {
    let export = read_export(file)?;
    if classify(&export)? == DocumentState::Encrypted {
        println!("Cannot format: input file is encrypted");
        return Ok(());
    }

    let (output, shape) = toggle_preferences(&export)?;
    match emit(target, file.to_path_buf(), &output)? {
        Some(path) => println!(
            "Converted preferences to {shape} and wrote to {:?}",
            path.display().to_string()
        ),
        None => eprintln!("Converted preferences to {shape} successfully"),
    }
    Ok(())
}

pub fn rehash(file: &Path, out: Option<PathBuf>) -> Result<()> {
    let export = read_export(file)?;
    let output = compute_file_hash(&export)?;
    emit(Target::File(out), file.to_path_buf(), &output)?;
    println!("File hash was recalculated successfully");
    Ok(())
}

pub fn verify(file: &Path) -> Result<()> {
    let export = read_export(file)?;
    if !verify_file_hash(&export)? {
        bail!("file hash of {} is invalid", file.display());
    }
    println!("File hash is valid");
    Ok(())
}

pub fn objectives(
    config: &ToolConfig,
    file: &Path,
    password: Option<String>,
    target: Target,
    numbers: Option<Vec<u32>>,
) -> Result<()> {
    let export = read_export(file)?;
    let password = match classify(&export)? {
        DocumentState::Encrypted => Some(resolve_password(password)?),
        DocumentState::Unencrypted => None,
    };

    let now = Utc::now();
    let numbers = match numbers {
        Some(numbers) => numbers,
        None => {
            let completed = export_completed_objectives(&export, password.as_deref(), now)?;
            select_objectives(&completed)?
        }
    };
    if numbers.is_empty() {
        println!("No objectives were selected");
        return Ok(());
    }
    let selected = objectives_by_number(&numbers)?;
    let output = complete_objectives(&export, password.as_deref(), &selected, now)?;

    let default = suffixed_path(file, &config.objectives_suffix);
    if let Some(path) = emit(target, default, &output)? {
        println!(
            "Objectives {numbers:?} are now completed and the file was exported to {:?}",
            path.display().to_string()
        );
    }
    Ok(())
}
