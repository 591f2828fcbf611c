//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request.
//!
//! Notes:
//! - Unknown XML fields, log levels or collision methods are load errors.
//! - A missing file at the default location means "use defaults"; a missing
//!   file named by PORTABLE_FS_CONFIG is an error.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{CONFIG_ENV_VAR, default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::collision::CollisionMethod;
use crate::helpers::io_error_with_help;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    temp_root: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    default_collision: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    cfg.temp_root = non_empty(parsed.temp_root.as_deref()).map(PathBuf::from);
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);

    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = non_empty(parsed.default_collision.as_deref()) {
        cfg.default_collision = s.parse::<CollisionMethod>().map_err(|e| anyhow!(e))?;
    }

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(io_error_with_help("read config xml", path))?;
    let parsed: XmlConfig =
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the effective Config (env override, then default location, then defaults).
pub fn load_config() -> Result<Config> {
    let explicit = env::var_os(CONFIG_ENV_VAR).is_some_and(|v| !v.is_empty());
    let path = default_config_path()?;
    if !path.exists() {
        if explicit {
            bail!("{CONFIG_ENV_VAR} points to '{}', which does not exist", path.display());
        }
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path)
}

/// Write a commented template to `path`. Refuses to overwrite or to write
/// beneath a symlinked directory.
pub fn write_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!("Refusing to create config: ancestor of {} is a symlink", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error_with_help("create config directory", parent))?;
    }

    let content = format!(
        "<!--\n  portable_fs configuration (XML)\n\n    temp_root          -> directory for temporary files (empty = OS temp dir)\n    log_level          -> quiet | normal | info | debug\n    log_file           -> path to log file (optional; stderr still used)\n    default_collision  -> normal | fail | overwrite | rename\n\n  CLI flags override these values.\n-->\n<config>\n  <temp_root></temp_root>\n  <log_level>{}</log_level>\n  <log_file></log_file>\n  <default_collision>{}</default_collision>\n</config>\n",
        LogLevel::default(),
        CollisionMethod::default(),
    );

    let mut f = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_error_with_help("create config", path))?;
    f.write_all(content.as_bytes())
        .map_err(io_error_with_help("write config", path))?;

    info!("Created template config at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn template_round_trips_to_defaults() {
        let td = tempdir().unwrap();
        let p = td.path().join("nested/config.xml");
        write_template_config(&p).unwrap();
        assert_eq!(load_config_from_xml_path(&p).unwrap(), Config::default());
        // Second write must not clobber.
        assert!(write_template_config(&p).is_err());
    }

    #[test]
    fn bad_collision_value_is_an_error() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config><default_collision>sideways</default_collision></config>").unwrap();
        let err = load_config_from_xml_path(&p).unwrap_err();
        assert!(format!("{err:#}").contains("sideways"));
    }
}
