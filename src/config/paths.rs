//! Locating the configuration file.

use crate::constants::{APP_NAME, CONFIG_FILE_ENV, CONFIG_FILE_NAME};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::ffi::OsString;
use std::path::PathBuf;

/// Path of the configuration file.
///
/// `BUGBLOOM_CONFIG` wins when set and non-empty. Otherwise the file is
/// `config.toml` in the platform config directory:
///
/// - Linux: `~/.config/bugbloom/`
/// - macOS: `~/Library/Application Support/bugbloom/`
/// - Windows: `%APPDATA%\bugbloom\`
pub fn config_file_path() -> Result<PathBuf> {
    resolve_config_file(
        std::env::var_os(CONFIG_FILE_ENV),
        ProjectDirs::from("", "", APP_NAME),
    )
}

fn resolve_config_file(explicit: Option<OsString>, dirs: Option<ProjectDirs>) -> Result<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    dirs.map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or(Error::ConfigDirNotFound)
}
