//! Exit statuses and messages of the `skelfit` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const BOX_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 3 4 8
f 3 8 7
f 2 3 7
f 2 7 6
f 1 5 8
f 1 8 4
";

fn skelfit(args: &[&str], usage_exit_code: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_skelfit"));
    command.args(args).env_remove("RUST_LOG");
    match usage_exit_code {
        Some(code) => command.env("SKELFIT_USAGE_EXIT_CODE", code),
        None => command.env_remove("SKELFIT_USAGE_EXIT_CODE"),
    };
    command.output().unwrap()
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn usage_error_exits_zero_with_banner() {
    let output = skelfit(&["m.obj", "-algo", "MIX"], None);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No blending weight given; exiting."));
    assert!(stdout.contains("Usage: skelfit"));
}

#[test]
fn usage_exit_code_comes_from_environment() {
    let output = skelfit(&["m.obj", "-algo", "MIX"], Some("2"));
    assert_eq!(output.status.code(), Some(2));

    // Out of range falls back to the default
    let output = skelfit(&["m.obj", "-algo", "MIX"], Some("-3"));
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn empty_mesh_reports_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = dir.path().join("empty.obj");
    fs::write(&mesh, "").unwrap();
    let out = dir.path().join("out");

    let output = skelfit(&[&path_arg(&mesh), "-outdir", &path_arg(&out)], None);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error reading file. Aborting."), "{}", stderr);
    assert!(!out.exists());
}

#[test]
fn direct_rig_exports_and_reports_notices() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = dir.path().join("box.obj");
    fs::write(&mesh, BOX_OBJ).unwrap();
    let out = dir.path().join("out");

    let output = skelfit(
        &[&path_arg(&mesh), "-outdir", &path_arg(&out), "-nofit", "-skel"],
        None,
    );
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No skeleton specified; ignoring."));
    assert!(stdout.contains("Export completed:"));
    assert_eq!(fs::read_to_string(out.join("skeleton.out")).unwrap().lines().count(), 18);
    assert_eq!(fs::read_to_string(out.join("attachment.out")).unwrap().lines().count(), 8);
}
