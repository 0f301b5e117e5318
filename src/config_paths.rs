//! Configuration paths for hotkeys
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/hotkeys/`
//! - Windows: `%APPDATA%\hotkeys\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "hotkeys";

/// Base name of the rolling log files (`hotkeys.log.YYYY-MM-DD`)
pub const LOG_FILE_PREFIX: &str = "hotkeys.log";

/// Base config directory
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/hotkeys`
///   - Else: `~/.config/hotkeys`
///
/// Windows:
///   - `%APPDATA%\hotkeys`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/hotkeys/hotkeys.yaml`
pub fn hotkeys_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("hotkeys.yaml"))
}

/// `~/.config/hotkeys/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let config = ensure_config_dir()?;
    let logs = config.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

/// Write the embedded default config to `hotkeys.yaml` unless one exists
///
/// Returns the path of the config file.
pub fn write_default_hotkeys_file() -> Result<PathBuf, String> {
    let dir = ensure_config_dir()?;
    let path = dir.join("hotkeys.yaml");
    if path.exists() {
        tracing::debug!("Keeping existing config at {}", path.display());
        return Ok(path);
    }

    fs::write(&path, crate::keymap::get_default_config_yaml())
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    tracing::info!("Wrote default hotkeys config to {}", path.display());
    Ok(path)
}
