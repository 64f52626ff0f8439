//! Integration tests for the gridcalc command line

use std::path::Path;
use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    run_with_config(args, None)
}

fn run_with_config(args: &[&str], config: Option<&Path>) -> (String, String, i32) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gridcalc"));
    command.env_remove("GRIDCALC_LOG");
    match config {
        Some(path) => {
            command.env("GRIDCALC_CONFIG", path);
        }
        // Tests must be deterministic and not depend on a user's config.toml.
        None => {
            command.arg("--no-config");
        }
    }
    let output = command.args(args).output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_precedence_and_parens() {
    let (stdout, _, code) = run_command(&["-c", "(1 + 2) * 3 - 4 / 2"]);
    assert_eq!(stdout.trim(), "7");
    assert_eq!(code, 0);
}

#[test]
fn test_auto_strip_equals() {
    let (stdout1, _, _) = run_command(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run_command(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert!(stdout.starts_with("#ERROR"));
    assert_eq!(code, 1);
}

#[test]
fn test_syntax_error() {
    let (stdout, stderr, code) = run_command(&["-c", "1 +"]);
    assert!(stdout.is_empty());
    assert!(stderr.starts_with("Error:"));
    assert_eq!(code, 1);
}

#[test]
fn test_set_cells_then_command() {
    let (stdout, _, code) = run_command(&["-s", "A1=5", "-s", "B1==A1*2", "-c", "b1 + a1"]);
    assert_eq!(stdout.trim(), "15");
    assert_eq!(code, 0);
}

#[test]
fn test_listing() {
    let (stdout, _, code) = run_command(&["-s", "A1=5", "-s", "B1==A1*2", "-s", "C1=hi"]);
    assert_eq!(stdout, "A1: 5 => 5\nB1: =A1*2 => 10\nC1: hi => hi\n");
    assert_eq!(code, 0);
}

#[test]
fn test_circular_reference_fails() {
    let (_, stderr, code) = run_command(&["-s", "A1==B1+1", "-s", "B1==A1+1"]);
    assert!(stderr.contains("circular"));
    assert_eq!(code, 1);
}

#[test]
fn test_pattern_restricts_names() {
    let (_, stderr, code) = run_command(&["--pattern", "^A[0-9]$", "-s", "B1=1"]);
    assert!(stderr.starts_with("Error:"));
    assert_eq!(code, 1);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.xml");
    let path_str = path.to_str().unwrap();

    let (_, _, code) = run_command(&["-s", "A1=4", "-s", "A2==A1*A1", "-o", path_str]);
    assert_eq!(code, 0);
    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<contents>=A1*A1</contents>"));

    let (stdout, _, code) = run_command(&[path_str, "-s", "A1=5", "-c", "A2"]);
    assert_eq!(stdout.trim(), "25");
    assert_eq!(code, 0);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.xml");
    let (_, stderr, code) = run_command(&[path.to_str().unwrap()]);
    assert!(stderr.starts_with("Error:"));
    assert_eq!(code, 1);
}

#[test]
fn test_config_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "pattern = \"^A[0-9]$\"\n").unwrap();

    let (_, _, code) = run_with_config(&["-s", "B1=1"], Some(&config));
    assert_eq!(code, 1);

    let (stdout, _, code) =
        run_with_config(&["--pattern", "^B[0-9]$", "-s", "B1=1", "-c", "B1"], Some(&config));
    assert_eq!(stdout.trim(), "1");
    assert_eq!(code, 0);
}

#[test]
fn test_bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "colour = \"blue\"\n").unwrap();

    let (_, stderr, code) = run_with_config(&["-c", "1"], Some(&config));
    assert!(stderr.contains("Failed to parse"));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run_command(&["--frobnicate"]);
    assert!(stderr.contains("Unknown option"));
    assert_eq!(code, 1);
}
