//! Integration tests for the `lxl` binary
//!
//! Covers the commands that work without network access: the success and
//! failure banners, exit codes and the subscription file.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary against a config root
fn lxl(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lxl"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_uninstall_reports_success() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("plugins")).unwrap();
    std::fs::write(root.path().join("plugins/foo.lua"), "-- foo").unwrap();

    let output = lxl(root.path(), &["uninstall", "foo"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Completed successfully"));
    assert!(!root.path().join("plugins/foo.lua").exists());
}

#[test]
fn test_uninstall_missing_addon_fails() {
    let root = TempDir::new().unwrap();
    // Keep the catalog lookup off the network
    std::fs::create_dir_all(root.path().join("lxl")).unwrap();
    std::fs::write(
        root.path().join("lxl/status.toml"),
        "remotes = [\"http://127.0.0.1:9/manifest.json\"]\n",
    )
    .unwrap();

    let output = lxl(root.path(), &["uninstall", "foo"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unable to uninstall"));
    assert!(!stdout(&output).contains("Completed successfully"));
}

#[test]
fn test_unsubscribe_default_remote_persists() {
    let root = TempDir::new().unwrap();
    let remote = "https://raw.githubusercontent.com/lite-xl/lite-xl-ide/master/manifest.json";

    let output = lxl(root.path(), &["unsubscribe", remote]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let state = std::fs::read_to_string(root.path().join("lxl/status.toml")).unwrap();
    assert!(state.contains("lite-xl-plugins"));
    assert!(!state.contains("lite-xl-ide"));

    let again = lxl(root.path(), &["unsubscribe", remote]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("Unable to unsubscribe"));
}

#[test]
fn test_help_prints_no_banner() {
    let root = TempDir::new().unwrap();

    let output = lxl(root.path(), &["help"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage"));
    assert!(!stdout(&output).contains("Completed successfully"));
}

#[test]
fn test_missing_argument_is_a_usage_error() {
    let root = TempDir::new().unwrap();

    let output = lxl(root.path(), &["install"]);

    assert!(!output.status.success());
    assert!(!stderr(&output).contains("Unable to install"));
}
