//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Global flags override values loaded from config.xml.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::collision::{AccessMode, CollisionMethod};
use crate::config::types::{Config, LogLevel};

/// Cross-platform file operations with collision-aware opens.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Cross-platform file operations with collision-aware opens")]
pub struct Args {
    /// Explicit config file (same as setting PORTABLE_FS_CONFIG).
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for temporary files (defaults to the OS temp dir).
    #[arg(long, value_hint = ValueHint::DirPath, global = true)]
    pub temp_root: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath, global = true)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Print where portable_fs looks for its config file, then exit.
    #[arg(long, help = "Print the config file location and exit")]
    pub print_config: bool,

    /// Write a template config file at the config location, then exit.
    #[arg(long, help = "Write a template config.xml and exit")]
    pub init_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show size and timestamps of a path.
    Stat {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Exit 0 if the path is a file or directory.
    Exists {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Open a file under an access mode and collision policy.
    Open {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// rw | ro | temp | exclusive
        #[arg(long, default_value_t = AccessMode::ReadWrite)]
        mode: AccessMode,
        /// normal | fail | overwrite | rename (defaults to the configured policy)
        #[arg(long)]
        collision: Option<CollisionMethod>,
        /// Text to write after opening.
        #[arg(long, value_name = "TEXT")]
        write: Option<String>,
    },
    /// Remove a file (a missing file counts as removed).
    Rm {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Create a directory and its parents.
    Mkdir {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        #[arg(long)]
        allow_existing: bool,
    },
    /// Remove a directory.
    Rmdir {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        #[arg(long, short = 'r')]
        recursive: bool,
    },
    /// List files (or directories with --dirs).
    Ls {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        #[arg(long, short = 'r')]
        recursive: bool,
        #[arg(long)]
        dirs: bool,
    },
    /// Rename a file or directory; never replaces an existing destination.
    Mv {
        #[arg(value_hint = ValueHint::AnyPath)]
        old: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        new: PathBuf,
    },
    /// Print the temp root, or create a fresh temp file with --create.
    Temp {
        #[arg(long)]
        create: bool,
        #[arg(long, value_name = "EXT", default_value = "")]
        ext: String,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(root) = &self.temp_root {
            cfg.temp_root = Some(root.clone());
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
