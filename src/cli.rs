//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a key event script against the configured bindings
//! - Loading a config file other than `~/.config/hotkeys/hotkeys.yaml`
//! - JSON output for scripting
//! - Writing the default config file

use clap::Parser;
use std::path::PathBuf;

/// Replay key events against hotkey bindings and print what fires
#[derive(Parser, Debug)]
#[command(
    name = "hotkeys",
    version,
    about = "Replay key events against hotkey bindings"
)]
pub struct CliArgs {
    /// YAML script of key events to replay
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Use this config file instead of the user config
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print fired bindings as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the default config to the user config directory and exit
    #[arg(long)]
    pub init_config: bool,
}

/// What the tool was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write the default config file
    InitConfig,
    /// Replay a script
    Replay {
        script: PathBuf,
        config: Option<PathBuf>,
        json: bool,
    },
}

impl CliArgs {
    /// Convert parsed CLI args into a command
    pub fn into_command(self) -> Result<Command, String> {
        if self.init_config {
            return Ok(Command::InitConfig);
        }

        let script = self
            .script
            .ok_or_else(|| "A script file is required (or pass --init-config)".to_string())?;

        Ok(Command::Replay {
            script,
            config: self.config,
            json: self.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("hotkeys").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_script_gives_replay() {
        let command = parse(&["keys.yaml"]).into_command().unwrap();
        assert_eq!(
            command,
            Command::Replay {
                script: PathBuf::from("keys.yaml"),
                config: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_config_and_json_flags() {
        let command = parse(&["--config", "my.yaml", "--json", "keys.yaml"])
            .into_command()
            .unwrap();
        assert_eq!(
            command,
            Command::Replay {
                script: PathBuf::from("keys.yaml"),
                config: Some(PathBuf::from("my.yaml")),
                json: true,
            }
        );
    }

    #[test]
    fn test_init_config_needs_no_script() {
        let command = parse(&["--init-config"]).into_command().unwrap();
        assert_eq!(command, Command::InitConfig);
    }

    #[test]
    fn test_missing_script_is_error() {
        assert!(parse(&[]).into_command().is_err());
    }
}
