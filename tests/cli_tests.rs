use clap::Parser;
use std::path::PathBuf;

use portable_fs::cli::{Args, Command};
use portable_fs::config::types::{Config, LogLevel};
use portable_fs::{AccessMode, CollisionMethod};

#[test]
fn effective_log_level_precedence() {
    let args = Args::parse_from(["portable_fs", "--debug", "--log-level", "quiet", "exists", "/tmp"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Debug)); // --debug wins

    let args = Args::parse_from(["portable_fs", "--log-level", "info", "exists", "/tmp"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Info));

    let args = Args::parse_from(["portable_fs", "exists", "/tmp"]);
    assert_eq!(args.effective_log_level(), None);
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let args = Args::parse_from(["portable_fs", "temp", "--create", "--ext", "log", "--temp-root", "/var/tmp"]);
    assert_eq!(args.temp_root, Some(PathBuf::from("/var/tmp")));
    assert_eq!(
        args.command,
        Some(Command::Temp { create: true, ext: "log".into() })
    );
}

#[test]
fn open_parses_mode_and_collision() {
    let args = Args::parse_from([
        "portable_fs", "open", "report.txt", "--mode", "exclusive", "--collision", "fail", "--write", "hi",
    ]);
    assert_eq!(
        args.command,
        Some(Command::Open {
            path: PathBuf::from("report.txt"),
            mode: AccessMode::ReadWriteExclusive,
            collision: Some(CollisionMethod::FailIfExists),
            write: Some("hi".into()),
        })
    );
}

#[test]
fn open_defaults_to_read_write_and_configured_policy() {
    let args = Args::parse_from(["portable_fs", "open", "a.txt"]);
    let Some(Command::Open { mode, collision, .. }) = args.command else {
        panic!("expected open");
    };
    assert_eq!(mode, AccessMode::ReadWrite);
    assert_eq!(collision, None);
}

#[test]
fn bad_mode_is_a_parse_error() {
    assert!(Args::try_parse_from(["portable_fs", "open", "a.txt", "--mode", "sideways"]).is_err());
}

#[test]
fn apply_overrides_only_touches_set_flags() {
    let mut cfg = Config {
        temp_root: Some(PathBuf::from("/from/config")),
        log_level: LogLevel::Info,
        log_file: Some(PathBuf::from("/from/config.log")),
        default_collision: CollisionMethod::RenameIfExists,
    };
    let args = Args::parse_from(["portable_fs", "--log-level", "quiet", "ls", "."]);
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.log_level, LogLevel::Quiet);
    assert_eq!(cfg.temp_root, Some(PathBuf::from("/from/config")));
    assert_eq!(cfg.log_file, Some(PathBuf::from("/from/config.log")));
    assert_eq!(cfg.default_collision, CollisionMethod::RenameIfExists);

    let args = Args::parse_from(["portable_fs", "--temp-root", "/cli", "--log-file", "/cli.log", "ls", "."]);
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.temp_root, Some(PathBuf::from("/cli")));
    assert_eq!(cfg.log_file, Some(PathBuf::from("/cli.log")));
}

#[test]
fn rmdir_and_ls_short_flags() {
    let args = Args::parse_from(["portable_fs", "rmdir", "-r", "build"]);
    assert_eq!(args.command, Some(Command::Rmdir { path: "build".into(), recursive: true }));
    let args = Args::parse_from(["portable_fs", "ls", "src", "-r", "--dirs"]);
    assert_eq!(args.command, Some(Command::Ls { path: "src".into(), recursive: true, dirs: true }));
}
