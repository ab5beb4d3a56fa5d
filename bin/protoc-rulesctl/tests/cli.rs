//! ---
//! rules_section: "04-command-line"
//! rules_subsection: "integration-tests"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "End-to-end tests for the control CLI."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use std::fs;

use assert_cmd::Command;

const BUILD_FILE: &str = r#"
[defaults]
COMPILER_PATH = "/opt/protoc/bin/protoc"

[[rules]]
name = "api"
sources = ["proto/api.proto"]
NATIVE_OUT = "gen"

[[rules]]
name = "py"
sources = ["proto/api.proto"]
SCRIPT_OUT = "gen/py"
COMMAND_DISPLAY = "Generating $TARGETS"
"#;

fn build_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("protoc-rules.toml"), BUILD_FILE).expect("write build file");
    dir
}

#[test]
fn emit_prints_targets_and_command() {
    let dir = build_dir();
    let root = dir.path().display().to_string();
    let output = Command::cargo_bin("protoc-rulesctl")
        .expect("binary")
        .current_dir(dir.path())
        .env_remove("PROTOC_RULES_CONFIG")
        .env_remove("PROTOC")
        .args(["emit", "--rule", "api"])
        .output()
        .expect("run");
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("[api]"));
    assert!(stdout.contains(&format!("{root}/gen/api.pb.h")));
    assert!(stdout.contains(&format!(
        "command: /opt/protoc/bin/protoc --cpp_out={root}/gen --proto_path={root}/proto {root}/proto/api.proto"
    )));
    assert!(!stdout.contains("[py]"));
}

#[test]
fn emit_json_lists_every_rule() {
    let dir = build_dir();
    let output = Command::cargo_bin("protoc-rulesctl")
        .expect("binary")
        .env_remove("PROTOC_RULES_CONFIG")
        .env_remove("PROTOC")
        .arg("emit")
        .arg("--build-file")
        .arg(dir.path().join("protoc-rules.toml"))
        .args(["--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success(), "{:?}", output);
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let reports = reports.as_array().expect("array");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["rule"], "api");
    assert_eq!(reports[1]["rule"], "py");
    assert!(reports[1]["description"]
        .as_str()
        .expect("description")
        .starts_with("Generating "));
}

#[test]
fn emit_takes_compiler_from_protoc_variable() {
    let dir = build_dir();
    let output = Command::cargo_bin("protoc-rulesctl")
        .expect("binary")
        .current_dir(dir.path())
        .env_remove("PROTOC_RULES_CONFIG")
        .env("PROTOC", "/env/bin/protoc")
        .args(["emit", "--rule", "api"])
        .output()
        .expect("run");
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("command: /env/bin/protoc --cpp_out="));
}

#[test]
fn unknown_rule_fails() {
    let dir = build_dir();
    Command::cargo_bin("protoc-rulesctl")
        .expect("binary")
        .current_dir(dir.path())
        .env_remove("PROTOC_RULES_CONFIG")
        .env_remove("PROTOC")
        .args(["emit", "--rule", "missing"])
        .assert()
        .failure();
}

#[test]
fn detect_prints_explicit_compiler() {
    Command::cargo_bin("protoc-rulesctl")
        .expect("binary")
        .args(["detect", "--compiler", "/custom/protoc"])
        .assert()
        .success()
        .stdout("/custom/protoc\n");
}

#[test]
fn detect_without_compiler_fails() {
    Command::cargo_bin("protoc-rulesctl")
        .expect("binary")
        .env("PATH", "")
        .env_remove("PROTOC")
        .arg("detect")
        .assert()
        .failure();
}
