use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::{Command, Output, Stdio};

const PASSWORD: &str = "correct-horse";

fn structured_export() -> Vec<u8> {
    let export = json!({
        "metadata": {
            "device_name": {"value": "Pixel 7", "info": "Device name"},
            "encryption": {"value": "Unencrypted", "info": "Encryption"}
        },
        "format": "aaps_structured",
        "security": {
            "file_hash": "--to-be-calculated--",
            "algorithm": "none"
        },
        "content": json!({"units": "mg/dl", "language": "en"}).to_string()
    });
    let bytes = serde_json::to_vec_pretty(&export).unwrap();
    aaps_export::compute_file_hash(&bytes).unwrap()
}

fn write_export(dir: &Path) -> PathBuf {
    let path = dir.join("settings.json");
    std::fs::write(&path, structured_export()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(assert_cmd::cargo::cargo_bin!("aaps-export-tool"))
        .args(args)
        .env_remove("AAPS_EXPORT_PASSWORD")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("run aaps-export-tool")
}

fn run_with_stdin(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(assert_cmd::cargo::cargo_bin!("aaps-export-tool"))
        .args(args)
        .env_remove("AAPS_EXPORT_PASSWORD")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn aaps-export-tool");
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().expect("wait for aaps-export-tool")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn encrypt_then_decrypt_with_default_names() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let input_str = input.to_str().unwrap();

    let out = run(&["encrypt", input_str, "-p", PASSWORD]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert!(stdout(&out).contains("Encrypted settings were exported to"));

    let encrypted = dir.path().join("settings_encrypted.json");
    let doc = read_json(&encrypted);
    assert_eq!(doc["format"], "aaps_encrypted");
    assert_eq!(doc["security"]["algorithm"], "v1");

    let out = run(&["decrypt", encrypted.to_str().unwrap(), "-p", PASSWORD]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));

    let decrypted = std::fs::read(dir.path().join("settings_encrypted_decrypted.json")).unwrap();
    assert_eq!(decrypted, std::fs::read(&input).unwrap());
}

#[test]
fn password_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let encrypted = dir.path().join("enc.json");

    let out = Command::new(assert_cmd::cargo::cargo_bin!("aaps-export-tool"))
        .args(["encrypt", input.to_str().unwrap(), "-o", encrypted.to_str().unwrap()])
        .env("AAPS_EXPORT_PASSWORD", PASSWORD)
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));

    let out = run(&["decrypt", encrypted.to_str().unwrap(), "-p", PASSWORD, "-c"]);
    assert!(out.status.success());
    let doc: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["format"], "aaps_structured");
}

#[test]
fn wrong_password_fails_with_dedicated_message() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let encrypted = dir.path().join("enc.json");
    run(&["encrypt", input.to_str().unwrap(), "-p", PASSWORD, "-o", encrypted.to_str().unwrap()]);

    let out = run(&["decrypt", encrypted.to_str().unwrap(), "-p", "battery-staple", "-c"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("password is probably wrong"), "stderr:\n{}", stderr(&out));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_password_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let encrypted = dir.path().join("enc.json");
    run(&["encrypt", input.to_str().unwrap(), "-p", PASSWORD, "-o", encrypted.to_str().unwrap()]);

    let out = run(&["decrypt", encrypted.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("no password given"), "stderr:\n{}", stderr(&out));
}

#[test]
fn decrypting_plain_export_prints_message() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());

    let out = run(&["decrypt", input.to_str().unwrap(), "-p", PASSWORD]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Cannot decrypt: input file is already decrypted"));
    assert!(!dir.path().join("settings_decrypted.json").exists());
}

#[test]
fn only_preferences_prints_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let encrypted = dir.path().join("enc.json");
    run(&["encrypt", input.to_str().unwrap(), "-p", PASSWORD, "-o", encrypted.to_str().unwrap()]);

    let out = run(&["decrypt", encrypted.to_str().unwrap(), "-p", PASSWORD, "--only-preferences", "-c"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    let prefs: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(prefs, json!({"units": "mg/dl", "language": "en"}));
}

#[test]
fn only_preferences_writes_plaintext_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.json");
    let export = json!({
        "format": "aaps_structured",
        "security": {"file_hash": "--to-be-calculated--", "algorithm": "none"},
        "content": "not json at all"
    });
    let bytes = aaps_export::compute_file_hash(&serde_json::to_vec_pretty(&export).unwrap()).unwrap();
    std::fs::write(&input, bytes).unwrap();
    let encrypted = dir.path().join("enc.json");
    run(&["encrypt", input.to_str().unwrap(), "-p", PASSWORD, "-o", encrypted.to_str().unwrap()]);

    let out = run(&["decrypt", encrypted.to_str().unwrap(), "-p", PASSWORD, "--only-preferences", "-c"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(out.stdout, b"not json at all");
}

#[test]
fn format_toggles_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let input_str = input.to_str().unwrap();

    let out = run(&["format", input_str]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert!(stdout(&out).contains("Converted preferences to JSON object"));
    assert_eq!(read_json(&input)["content"]["units"], "mg/dl");

    let out = run(&["format", input_str]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Converted preferences to string"));
    assert_eq!(std::fs::read(&input).unwrap(), structured_export());
}

#[test]
fn rehash_repairs_edited_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let input_str = input.to_str().unwrap();

    let edited = String::from_utf8(std::fs::read(&input).unwrap())
        .unwrap()
        .replace("Pixel 7", "Pixel 8");
    std::fs::write(&input, edited).unwrap();

    let out = run(&["verify", input_str]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid"));

    let out = run(&["rehash", input_str]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("File hash was recalculated successfully"));

    let out = run(&["verify", input_str]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("File hash is valid"));
}

#[test]
fn objectives_are_completed() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());

    let out = run(&["objectives", input.to_str().unwrap(), "-j", "1,2"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));

    let doc = read_json(&dir.path().join("settings_objectives.json"));
    let prefs: Value = serde_json::from_str(doc["content"].as_str().unwrap()).unwrap();
    assert_eq!(prefs["ObjectivesLoopUsed"], "true");
    assert!(prefs["Objectives_usage_accomplished"].is_string());
}

#[test]
fn empty_objective_selection_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());

    let out = run_with_stdin(&["objectives", input.to_str().unwrap()], b"\n");
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert!(stdout(&out).contains("No objectives were selected"));
    assert!(!dir.path().join("settings_objectives.json").exists());
}

#[test]
fn piped_password_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let encrypted = dir.path().join("enc.json");

    let out = run_with_stdin(
        &["encrypt", input.to_str().unwrap(), "-o", encrypted.to_str().unwrap()],
        b"correct-horse\n",
    );
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));

    let out = run(&["decrypt", encrypted.to_str().unwrap(), "-p", PASSWORD, "-c"]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
}

#[test]
fn unknown_objective_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());

    let out = run(&["objectives", input.to_str().unwrap(), "-j", "42"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown objective 42"));
}

#[test]
fn config_file_changes_default_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_export(dir.path());
    let config = dir.path().join("tool.toml");
    std::fs::write(&config, "encrypted_suffix = \".locked\"\n").unwrap();

    let out = run(&[
        "--config",
        config.to_str().unwrap(),
        "encrypt",
        input.to_str().unwrap(),
        "-p",
        PASSWORD,
    ]);
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert!(dir.path().join("settings.locked.json").exists());
}
