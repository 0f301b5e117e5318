//! hotkeys: replay a script of key events against the configured bindings
//!
//! ```yaml
//! - { action: down, key: Control }
//! - { action: down, key: u, code: KeyU }
//! - { action: up, key: u, code: KeyU }
//! - { action: blur }
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use hotkeys::keymap::{
    AllowNativeShortcuts, BindingId, Handler, HotkeyEvent, Hotkeys, HotkeysConfig, KeyEvent,
    KeyState, KeyboardEngine,
};

mod cli;

use cli::{CliArgs, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Action {
    Down,
    Up,
    Blur,
}

/// One line of a replay script
#[derive(Debug, Clone, Deserialize)]
struct ScriptStep {
    action: Action,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    repeat: bool,
    #[serde(default)]
    target: Option<String>,
}

impl ScriptStep {
    /// The key event for this step, `None` for blur
    fn to_event(&self, index: usize) -> Result<Option<KeyEvent>> {
        let state = match self.action {
            Action::Blur => return Ok(None),
            Action::Down => KeyState::Down,
            Action::Up => KeyState::Up,
        };
        let Some(key) = self.key.clone() else {
            bail!("Step {} needs a key", index + 1);
        };

        Ok(Some(KeyEvent {
            key,
            code: self.code.clone(),
            state,
            repeat: self.repeat,
            target: self.target.clone(),
        }))
    }
}

/// Bindings fired by one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Fired {
    step: usize,
    bindings: Vec<BindingId>,
}

fn parse_script(yaml: &str) -> Result<Vec<ScriptStep>> {
    serde_yaml::from_str(yaml).context("Invalid replay script")
}

/// Mount every configured binding and run the script through the engine
fn replay(config: &HotkeysConfig, steps: &[ScriptStep]) -> Result<Vec<Fired>> {
    let engine = KeyboardEngine::new(config.engine.clone());
    let dispatcher = AllowNativeShortcuts::with_reserved(engine.clone(), &config.native_shortcuts);

    let fired: Rc<RefCell<Vec<BindingId>>> = Rc::new(RefCell::new(Vec::new()));
    let handlers: BTreeMap<BindingId, Handler> = config
        .bindings
        .keys()
        .map(|id| {
            let fired = fired.clone();
            let binding = id.clone();
            let handler = Handler::new(move |event: &HotkeyEvent| {
                tracing::info!(
                    "{} fired by '{}' (simulated: {})",
                    binding,
                    event.sequence,
                    event.simulated
                );
                fired.borrow_mut().push(binding.clone());
            });
            (id.clone(), handler)
        })
        .collect();

    let hotkeys = Hotkeys::mount(&dispatcher, &config.bindings, &handlers)?;
    tracing::debug!(
        "Replaying {} steps against {} bindings",
        steps.len(),
        config.bindings.len()
    );

    let mut results = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        match step.to_event(index)? {
            Some(event) => {
                engine.dispatch(&event);
            }
            None => engine.blur(),
        }

        let bindings: Vec<BindingId> = fired.borrow_mut().drain(..).collect();
        if !bindings.is_empty() {
            results.push(Fired {
                step: index + 1,
                bindings,
            });
        }
    }

    hotkeys.unmount();
    Ok(results)
}

fn load_config(path: Option<&Path>) -> Result<HotkeysConfig> {
    match path {
        Some(path) => HotkeysConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(HotkeysConfig::load()),
    }
}

fn print_results(results: &[Fired], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for fired in results {
        let ids: Vec<&str> = fired.bindings.iter().map(BindingId::as_str).collect();
        println!("step {}: {}", fired.step, ids.join(", "));
    }
    Ok(())
}

fn main() -> Result<()> {
    hotkeys::tracing::init();

    let command = CliArgs::parse()
        .into_command()
        .map_err(anyhow::Error::msg)?;

    match command {
        Command::InitConfig => {
            let path =
                hotkeys::config_paths::write_default_hotkeys_file().map_err(anyhow::Error::msg)?;
            println!("{}", path.display());
        }
        Command::Replay {
            script,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let content = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read {}", script.display()))?;
            let steps = parse_script(&content)?;
            let results = replay(&config, &steps)?;
            print_results(&results, json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> HotkeysConfig {
        HotkeysConfig::parse_yaml(yaml).unwrap()
    }

    #[test]
    fn test_replay_half_page_fires_once_per_press() {
        let config = config(
            r#"
bindings:
  half_page_up: "ctrl+u"
"#,
        );
        let steps = parse_script(
            r#"
- { action: down, key: Control, code: ControlLeft }
- { action: down, key: u, code: KeyU }
- { action: up, key: u, code: KeyU }
- { action: down, key: u, code: KeyU }
"#,
        )
        .unwrap();

        let results = replay(&config, &steps).unwrap();
        assert_eq!(
            results,
            vec![
                Fired {
                    step: 2,
                    bindings: vec![BindingId::from("half_page_up")]
                },
                Fired {
                    step: 4,
                    bindings: vec![BindingId::from("half_page_up")]
                },
            ]
        );
    }

    #[test]
    fn test_replay_blur_cancels_sequence() {
        let config = config(
            r#"
bindings:
  top: "g g"
"#,
        );
        let steps = parse_script(
            r#"
- { action: down, key: g }
- { action: up, key: g }
- { action: blur }
- { action: down, key: g }
- { action: up, key: g }
- { action: down, key: g }
"#,
        )
        .unwrap();

        let results = replay(&config, &steps).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].step, 6);
    }

    #[test]
    fn test_replay_skips_native_shortcut() {
        let config = config(
            r#"
native_shortcuts: ["ctrl+s"]
bindings:
  save: "ctrl+s"
"#,
        );
        let steps = parse_script(
            r#"
- { action: down, key: Control }
- { action: down, key: s }
"#,
        )
        .unwrap();

        assert!(replay(&config, &steps).unwrap().is_empty());
    }

    #[test]
    fn test_step_without_key_is_error() {
        let steps = parse_script("- { action: down }").unwrap();
        assert!(replay(&HotkeysConfig::default(), &steps).is_err());
    }

    #[test]
    fn test_unknown_action_is_error() {
        assert!(parse_script("- { action: press, key: a }").is_err());
    }
}
