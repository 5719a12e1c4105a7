//! CLI contract tests driving the built binary

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_harmony-heal")
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run harmony-heal")
}

const MESSY: &str = "import os\n\ndef getValue(x):\n    try:\n        return x\n    except:\n        return None\n";

#[test]
fn test_heal_in_place_writes_backup() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.py");
    std::fs::write(&file, MESSY).unwrap();

    let out = run(dir.path(), &["heal", "app.py"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let healed = std::fs::read_to_string(&file).unwrap();
    assert!(healed.starts_with("# import os\n"));
    assert!(healed.contains("except Exception:"));
    assert_eq!(std::fs::read_to_string(dir.path().join("app.py.bak")).unwrap(), MESSY);
}

#[test]
fn test_no_backup_and_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.py");
    std::fs::write(&file, MESSY).unwrap();

    let out = run(dir.path(), &["heal", "app.py", "--dry-run"]);
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&file).unwrap(), MESSY);
    assert!(String::from_utf8_lossy(&out.stdout).contains("TICKS"));

    let out = run(dir.path(), &["heal", "app.py", "--no-backup"]);
    assert!(out.status.success());
    assert_ne!(std::fs::read_to_string(&file).unwrap(), MESSY);
    assert!(!dir.path().join("app.py.bak").exists());
}

#[test]
fn test_heal_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.py"), "x = 1   \n").unwrap();

    let out = run(dir.path(), &["heal", "app.py", "-o", "fixed.py"]);
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(dir.path().join("app.py")).unwrap(), "x = 1   \n");
    assert_eq!(std::fs::read_to_string(dir.path().join("fixed.py")).unwrap(), "x = 1\n");
}

#[test]
fn test_heal_stdin_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(bin())
        .args(["heal", "--stdin"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"import sys\nprint(1)   \n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "# import sys\nprint(1)\n");
}

#[test]
fn test_diagnose_json_for_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("pkg")).unwrap();
    std::fs::write(dir.path().join("pkg/a.py"), MESSY).unwrap();
    std::fs::write(dir.path().join("pkg/b.py"), "x = 1\n").unwrap();

    let out = run(dir.path(), &["diagnose", "pkg", "--format", "json"]);
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let docs = parsed.as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["gaps"].as_array().unwrap().len(), 4);
    assert_eq!(docs[1]["gaps"].as_array().unwrap().len(), 0);
    // diagnose never writes
    assert_eq!(std::fs::read_to_string(dir.path().join("pkg/a.py")).unwrap(), MESSY);
}

#[test]
fn test_init_then_config_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["init"]);
    assert!(out.status.success());
    assert!(dir.path().join("harmony.toml").exists());
    assert!(!run(dir.path(), &["init"]).status.success());

    std::fs::write(dir.path().join("bad.toml"), "max_ticks = 0\n").unwrap();
    std::fs::write(dir.path().join("app.py"), "x = 1\n").unwrap();
    let out = run(dir.path(), &["--config", "bad.toml", "heal", "app.py"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("max_ticks"));
}

#[test]
fn test_zero_max_ticks_fails_once_before_any_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.py"), MESSY).unwrap();
    std::fs::write(dir.path().join("b.py"), MESSY).unwrap();

    let out = run(dir.path(), &["heal", "a.py", "b.py", "--max-ticks", "0"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("max_ticks").count(), 1, "stderr: {stderr}");
    assert_eq!(std::fs::read_to_string(dir.path().join("a.py")).unwrap(), MESSY);
    assert!(!dir.path().join("a.py.bak").exists());
}

#[test]
fn test_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["diagnose", "nope.py"]);
    assert!(!out.status.success());
}
