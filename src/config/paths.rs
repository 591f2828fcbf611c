//! Default path helpers and symlink checks.

use anyhow::{Result, anyhow};
use dirs::config_dir;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::APP_DIR;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PORTABLE_FS_CONFIG";

/// Config file location: `$PORTABLE_FS_CONFIG` if set, else
/// `<config_dir>/portable_fs/config.xml`. A relative override is taken
/// relative to the current directory.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        let p = PathBuf::from(p);
        if p.is_relative() {
            return Ok(env::current_dir()?.join(p));
        }
        return Ok(p);
    }
    if let Some(mut base) = config_dir() {
        base.push(APP_DIR);
        base.push("config.xml");
        return Ok(base);
    }
    env::var("HOME")
        .map(|h| PathBuf::from(h).join(".config").join(APP_DIR).join("config.xml"))
        .map_err(|_| anyhow!("cannot determine a config directory for this user"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
