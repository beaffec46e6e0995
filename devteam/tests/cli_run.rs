//! CLI tests for `devteam run`.
//!
//! Spawns the devteam binary for runs that never reach the network and checks
//! exit codes, status lines and produced files.

use std::fs;
use std::process::Command;

use devteam::exit_codes;

const UNSET_KEY_ENV: &str = "DEVTEAM_CLI_TEST_KEY_UNSET";

fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("devteam.toml");
    fs::write(
        &path,
        format!("output_dir = \"out\"\n[model]\napi_key_env = \"{UNSET_KEY_ENV}\"\n"),
    )
    .expect("write config");
    path
}

#[test]
fn empty_requirements_exit_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("reqs.json"), "[]").expect("write reqs");
    write_config(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_devteam"))
        .current_dir(temp.path())
        .args(["run", "--requirements", "reqs.json"])
        .output()
        .expect("devteam run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No requirements to process."));
    assert!(stdout.contains("Processing complete."));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn string_requirements_exit_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("reqs.json"), "\"just a string\"").expect("write reqs");
    write_config(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_devteam"))
        .current_dir(temp.path())
        .args(["run", "--requirements", "reqs.json"])
        .output()
        .expect("devteam run");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid requirements input"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn missing_api_key_fails_before_any_artifact() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("reqs.json"), r#"["Create endpoint /hello"]"#)
        .expect("write reqs");
    write_config(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_devteam"))
        .current_dir(temp.path())
        .env_remove(UNSET_KEY_ENV)
        .args(["run", "--requirements", "reqs.json"])
        .output()
        .expect("devteam run");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Processing Story 1..."));
    assert!(!stdout.contains("Application code generated and saved."));
    assert!(!temp.path().join("out/app_code_1.py").exists());
}

#[test]
fn init_writes_default_config() {
    let temp = tempfile::tempdir().expect("tempdir");

    let status = Command::new(env!("CARGO_BIN_EXE_devteam"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("devteam init");

    assert_eq!(status.code(), Some(exit_codes::OK));
    let contents = fs::read_to_string(temp.path().join("devteam.toml")).expect("read config");
    assert!(contents.contains("gpt-3.5-turbo"));
}
