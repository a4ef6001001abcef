//! The `lumen` binary: output streams and exit codes.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn write(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

fn lumen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lumen"))
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
fn run_prints_every_pass() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "counter.lumen", "clicks: 0 … ∆ Button() … . + 1\nclicks");
    let path = path.to_str().unwrap();

    let output = lumen(&["run", path, "--produce=Button:⊤", "--produce=Button:⊥"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "0\n1\n2\n");
}

#[test]
fn run_loads_borrowed_sources() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shapes.lumen", "ƒ area(r•#) r · r");
    let path = write(dir.path(), "main.lumen", "↓ shapes.area\narea(3)");

    let output = lumen(&["run", path.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "9\n");
}

#[test]
fn exceptions_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "main.lumen", "1 ÷ 0");

    let output = lumen(&["run", path.to_str().unwrap(), "--color=never"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("[E6008]"), "{}", stderr(&output));
}

#[test]
fn check_exits_nonzero_only_for_errors() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(dir.path(), "broken.lumen", "1 + ⊤");
    let output = lumen(&["check", broken.to_str().unwrap(), "--color=never"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("[E3011]"), "{}", stderr(&output));

    let noisy = write(dir.path(), "noisy.lumen", "1\n2");
    let output = lumen(&["check", noisy.to_str().unwrap(), "--color=never"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("OK: "));
}

#[test]
fn inspection_commands_print_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "main.lumen", "x: 1\nx + 1");
    let path = path.to_str().unwrap();

    let lexed = lumen(&["lex", path]);
    assert!(lexed.status.success());
    assert!(stdout(&lexed).starts_with("Tokens for "));

    let parsed = lumen(&["parse", path]);
    assert!(parsed.status.success());
    assert!(stdout(&parsed).starts_with("Program"));

    let steps = lumen(&["steps", path]);
    assert!(steps.status.success());
    assert!(stdout(&steps).contains("binary +"));
}

#[test]
fn bad_invocations_exit_nonzero() {
    assert_eq!(lumen(&["run"]).status.code(), Some(1));
    assert_eq!(lumen(&["frobnicate"]).status.code(), Some(1));
    assert_eq!(lumen(&["run", "missing.lumen"]).status.code(), Some(1));
    let bad_flag = lumen(&["run", "x.lumen", "--max-steps=many"]);
    assert_eq!(bad_flag.status.code(), Some(1));
    assert!(stderr(&bad_flag).contains("--max-steps"));
}
