use assert_cmd::cargo;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Run the binary against an empty config so the user's own config is never read.
fn run(td: &TempDir, args: &[&str]) -> Output {
    let cfg = td.child("config.xml");
    if !cfg.path().exists() {
        cfg.write_str("<config></config>").unwrap();
    }
    let me = cargo::cargo_bin!("portable_fs");
    Command::new(me)
        .arg("--config")
        .arg(cfg.path())
        .arg("--temp-root")
        .arg(td.path())
        .args(args)
        .output()
        .expect("spawn binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn arg(p: &Path) -> &str {
    p.to_str().expect("utf-8 temp path")
}

#[test]
fn binary_print_config_succeeds() {
    let me = cargo::cargo_bin!("portable_fs");
    let out = Command::new(me)
        .arg("--print-config")
        .output()
        .expect("spawn binary");
    assert!(out.status.success(), "binary should succeed with --print-config");
}

#[test]
fn open_fail_if_exists_twice() {
    let td = TempDir::new().unwrap();
    let report = td.child("report.txt");

    let first = run(&td, &["open", arg(report.path()), "--collision", "fail", "--write", "hello"]);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert_eq!(fs::read_to_string(report.path()).unwrap(), "hello");

    let second = run(&td, &["open", arg(report.path()), "--collision", "fail"]);
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("did not happen"));
}

#[test]
fn open_rename_prints_chosen_path() {
    let td = TempDir::new().unwrap();
    td.child("base.txt").touch().unwrap();
    td.child("base-2.txt").touch().unwrap();

    let out = run(&td, &["open", arg(&td.path().join("base.txt")), "--collision", "rename"]);
    assert!(out.status.success());
    assert!(stdout(&out).trim_end().ends_with("base-3.txt"), "stdout: {}", stdout(&out));
    assert!(td.path().join("base-3.txt").exists());
}

#[test]
fn configured_default_collision_applies() {
    let td = TempDir::new().unwrap();
    td.child("config.xml")
        .write_str("<config><default_collision>fail</default_collision></config>")
        .unwrap();
    td.child("taken.txt").touch().unwrap();
    let out = run(&td, &["open", arg(&td.path().join("taken.txt"))]);
    assert!(!out.status.success());
}

#[test]
fn exists_exit_status_tracks_result() {
    let td = TempDir::new().unwrap();
    td.child("here.txt").touch().unwrap();
    assert!(run(&td, &["exists", arg(&td.path().join("here.txt"))]).status.success());
    let missing = run(&td, &["exists", arg(&td.path().join("gone.txt"))]);
    assert!(!missing.status.success());
    assert_eq!(stdout(&missing).trim(), "false");
}

#[test]
fn mkdir_ls_rmdir_round_trip() {
    let td = TempDir::new().unwrap();
    let dir = td.path().join("work");

    assert!(run(&td, &["mkdir", arg(&dir)]).status.success());
    assert!(!run(&td, &["mkdir", arg(&dir)]).status.success());
    assert!(run(&td, &["mkdir", arg(&dir), "--allow-existing"]).status.success());

    fs::write(dir.join("a.txt"), b"a").unwrap();
    let ls = run(&td, &["ls", arg(&dir)]);
    assert!(ls.status.success());
    assert!(stdout(&ls).contains("a.txt"));

    assert!(!run(&td, &["rmdir", arg(&dir)]).status.success());
    assert!(run(&td, &["rmdir", "-r", arg(&dir)]).status.success());
    assert!(!dir.exists());
}

#[test]
fn temp_create_makes_empty_file() {
    let td = TempDir::new().unwrap();
    let out = run(&td, &["temp", "--create", "--ext", "log"]);
    assert!(out.status.success());
    let printed = stdout(&out);
    let p = Path::new(printed.trim());
    assert!(p.starts_with(td.path()));
    assert_eq!(p.extension().and_then(|e| e.to_str()), Some("log"));
    assert_eq!(fs::metadata(p).unwrap().len(), 0);
}

#[test]
fn rm_and_mv() {
    let td = TempDir::new().unwrap();
    let a = td.child("a.txt");
    a.write_str("A").unwrap();
    let b = td.path().join("b.txt");

    assert!(run(&td, &["mv", arg(a.path()), arg(&b)]).status.success());
    assert!(b.exists());
    assert!(run(&td, &["rm", arg(&b)]).status.success());
    assert!(run(&td, &["rm", arg(&b)]).status.success());
}

#[test]
fn missing_temp_root_is_reported() {
    let td = TempDir::new().unwrap();
    let cfg = td.child("config.xml");
    cfg.write_str("<config></config>").unwrap();
    let me = cargo::cargo_bin!("portable_fs");
    let out = Command::new(me)
        .arg("--config")
        .arg(cfg.path())
        .arg("--temp-root")
        .arg(td.path().join("absent"))
        .args(["temp"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(7));
}

#[cfg(target_os = "linux")]
#[test]
fn failed_write_is_a_negative_result() {
    let full = Path::new("/dev/full");
    if fs::OpenOptions::new().write(true).open(full).is_err() {
        return;
    }
    let td = TempDir::new().unwrap();
    let out = run(&td, &["open", "/dev/full", "--write", "no room"]);
    assert_eq!(out.status.code(), Some(1), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("did not happen"));
}

#[test]
fn opening_a_directory_is_a_negative_result() {
    let td = TempDir::new().unwrap();
    let dir = td.child("adir");
    dir.create_dir_all().unwrap();
    let out = run(&td, &["open", arg(dir.path()), "--mode", "ro", "--collision", "normal"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("did not happen"));
}
