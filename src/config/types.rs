//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::collision::CollisionMethod;
use crate::errors::FsError;
use crate::platform::PlatformContext;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and CLI results (default)
    #[default]
    Normal,
    /// Operation-level detail
    Info,
    /// Debug/trace, including lock hand-offs
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Temp root handed to the platform context; None means the OS temp dir.
    pub temp_root: Option<PathBuf>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Collision policy used by `open` when none is given on the command line.
    pub default_collision: CollisionMethod,
}

impl Config {
    pub fn with_temp_root(temp_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: Some(temp_root.into()),
            ..Default::default()
        }
    }

    /// Effective temp root.
    pub fn temp_root(&self) -> PathBuf {
        match self.temp_root.as_deref() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::env::temp_dir(),
        }
    }

    /// Build the platform context. Fails unless the temp root is an existing directory.
    pub fn platform(&self) -> Result<PlatformContext, FsError> {
        PlatformContext::new(self.temp_root())
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_level_parse_aliases() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::parse(" verbose "), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!("loud".parse::<LogLevel>().unwrap_err().contains("loud"));
    }

    #[test]
    fn default_uses_os_temp() {
        let cfg = Config::default();
        assert_eq!(cfg.temp_root(), std::env::temp_dir());
        assert_eq!(cfg.default_collision, CollisionMethod::NormalOpen);
        assert!(cfg.platform().is_ok());
    }

    #[test]
    fn platform_rejects_missing_temp_root() {
        let td = tempdir().unwrap();
        let cfg = Config::with_temp_root(td.path().join("missing"));
        assert!(matches!(cfg.platform(), Err(FsError::InvalidPlatform(_))));
        let ok = Config::with_temp_root(td.path());
        assert_eq!(ok.platform().unwrap().temp_root(), td.path());
    }
}
