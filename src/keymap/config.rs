//! YAML configuration for hotkeys
//!
//! A config file holds engine settings, the native shortcuts that must never
//! be captured, and the bindings themselves:
//!
//! ```yaml
//! engine:
//!   simulate_missing_key_press_events: true
//! native_shortcuts: ["cmd+s", "cmd+p"]
//! bindings:
//!   scroll_top: "g g"
//!   scroll_down: "j"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::binding::BindingId;
use super::sequence::KeySequence;

/// Behaviour switches for [`KeyboardEngine`](super::KeyboardEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Emit a simulated key press for chords whose browser key press event is missing
    /// (`ctrl+u` only produces a key-down for `u`)
    pub simulate_missing_key_press_events: bool,
    /// Drop auto-repeat key-downs while a key is held
    pub ignore_repeated_events_when_key_held_down: bool,
    /// Identify keys by physical code so `J`/`j` and `!`/`1` are the same key
    pub normalize_key_codes: bool,
    /// Stop offering an event to later registrations once one handled it
    ///
    /// Off so a plain `u` binding doesn't swallow `cmd+u`.
    pub stop_event_propagation_after_handling: bool,
    /// Event target tags (e.g. `input`, `textarea`) whose key events are ignored
    pub ignore_tags: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulate_missing_key_press_events: true,
            ignore_repeated_events_when_key_held_down: false,
            normalize_key_codes: true,
            stop_event_propagation_after_handling: false,
            ignore_tags: Vec::new(),
        }
    }
}

/// Root structure of a hotkeys YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeysConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    /// Shortcuts left to the browser/OS
    #[serde(default = "super::defaults::default_native_shortcuts")]
    pub native_shortcuts: Vec<KeySequence>,
    /// Binding id → key sequence string
    #[serde(default)]
    pub bindings: BTreeMap<BindingId, String>,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            native_shortcuts: super::defaults::default_native_shortcuts(),
            bindings: BTreeMap::new(),
        }
    }
}

impl HotkeysConfig {
    /// Parse a config from a YAML string
    ///
    /// Binding sequences are validated here so a bad config fails at load
    /// time rather than at mount.
    pub fn parse_yaml(yaml: &str) -> Result<Self, HotkeyError> {
        let config: HotkeysConfig =
            serde_yaml::from_str(yaml).map_err(|e| HotkeyError::ParseError(e.to_string()))?;

        for (id, sequence) in &config.bindings {
            KeySequence::parse(sequence).map_err(|e| e.for_binding(id))?;
        }

        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, HotkeyError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HotkeyError::IoError(e.to_string()))?;

        Self::parse_yaml(&content)
    }

    /// Load the embedded default config with the user config merged on top
    ///
    /// A missing or broken user file leaves the defaults in place.
    pub fn load() -> Self {
        let defaults = super::defaults::load_default_config();

        let Some(path) = crate::config_paths::hotkeys_file() else {
            tracing::debug!("No config directory available, using defaults");
            return defaults;
        };

        if !path.exists() {
            tracing::debug!(
                "Hotkeys config not found at {}, using defaults",
                path.display()
            );
            return defaults;
        }

        match Self::load_from_file(&path) {
            Ok(user) => {
                tracing::info!(
                    "Loaded hotkeys config from {} ({} bindings)",
                    path.display(),
                    user.bindings.len()
                );
                super::defaults::merge_configs(defaults, user)
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}, using defaults", path.display(), e);
                defaults
            }
        }
    }
}

/// Errors raised while configuring hotkeys
///
/// Key event handling itself never fails; all of these surface at
/// configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    IoError(String),
    ParseError(String),
    /// A key sequence string is empty or has an empty key name
    MalformedSequence { input: String, reason: String },
    /// The key map and handler map don't have the same binding ids
    MismatchedBinding {
        missing_handlers: Vec<BindingId>,
        missing_sequences: Vec<BindingId>,
    },
}

impl HotkeyError {
    /// Attach the binding id to a malformed sequence error
    pub fn for_binding(self, id: &BindingId) -> Self {
        match self {
            HotkeyError::MalformedSequence { input, reason } => HotkeyError::MalformedSequence {
                input,
                reason: format!("{} (binding '{}')", reason, id),
            },
            other => other,
        }
    }
}

impl std::fmt::Display for HotkeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HotkeyError::IoError(e) => write!(f, "IO error: {}", e),
            HotkeyError::ParseError(e) => write!(f, "Parse error: {}", e),
            HotkeyError::MalformedSequence { input, reason } => {
                write!(f, "Malformed key sequence {:?}: {}", input, reason)
            }
            HotkeyError::MismatchedBinding {
                missing_handlers,
                missing_sequences,
            } => {
                let join = |ids: &[BindingId]| {
                    ids.iter()
                        .map(BindingId::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                write!(
                    f,
                    "Mismatched bindings: without handler [{}], without key sequence [{}]",
                    join(missing_handlers),
                    join(missing_sequences)
                )
            }
        }
    }
}

impl std::error::Error for HotkeyError {}
