//! Default hotkeys configuration
//!
//! The default config ships embedded in the binary (`hotkeys.yaml` at the
//! project root). User config is merged on top of it.

use super::config::HotkeysConfig;
use super::sequence::KeySequence;

/// Default config YAML embedded at compile time
const DEFAULT_CONFIG_YAML: &str = include_str!("../../hotkeys.yaml");

/// Shortcuts that belong to the browser or OS (save, print, tabs, clipboard...)
const NATIVE_SHORTCUTS: &[&str] = &[
    "cmd+s", "cmd+p", "cmd+w", "cmd+t", "cmd+n", "cmd+q", "cmd+r", "cmd+l", "cmd+f", "cmd+c",
    "cmd+v", "cmd+x",
];

/// Get the embedded default config YAML
pub fn get_default_config_yaml() -> &'static str {
    DEFAULT_CONFIG_YAML
}

/// Native shortcuts reserved by default, with `cmd` resolved for this platform
pub fn default_native_shortcuts() -> Vec<KeySequence> {
    NATIVE_SHORTCUTS
        .iter()
        .filter_map(|s| KeySequence::parse(s).ok())
        .collect()
}

/// Parse the embedded default config
pub fn load_default_config() -> HotkeysConfig {
    match HotkeysConfig::parse_yaml(DEFAULT_CONFIG_YAML) {
        Ok(config) => {
            tracing::debug!(
                "Loaded embedded default config ({} bindings)",
                config.bindings.len()
            );
            config
        }
        Err(e) => {
            tracing::warn!("Failed to parse embedded config: {}, using empty config", e);
            HotkeysConfig::default()
        }
    }
}

/// Merge a user config over a base config
///
/// Bindings with the same id are replaced, new ids are added. Engine
/// settings and native shortcuts come from the user config.
pub fn merge_configs(base: HotkeysConfig, user: HotkeysConfig) -> HotkeysConfig {
    let mut bindings = base.bindings;
    for (id, sequence) in user.bindings {
        if let Some(previous) = bindings.insert(id.clone(), sequence) {
            tracing::debug!("User config overrides '{}' (was '{}')", id, previous);
        }
    }

    HotkeysConfig {
        engine: user.engine,
        native_shortcuts: user.native_shortcuts,
        bindings,
    }
}
