//! Keyboard shortcut handling
//!
//! This module turns a map of key sequence strings and a map of handlers
//! into hotkey registrations that:
//! - Parse sequences like `"g g"` and `"ctrl+u"` into chords
//! - Keep single-chord and multi-chord bindings in separate registrations
//! - Run a handler once per key press even when the engine simulates a second event
//! - Clear the key history after a sequence completes
//! - Leave native browser/OS shortcuts alone
//!
//! # Architecture
//!
//! ```text
//! key map + handlers → Hotkeys::mount() → AllowNativeShortcuts → KeyboardEngine
//! KeyEvent → KeyboardEngine::dispatch() → guard → clear history → Handler
//! ```
//!
//! # Mounting
//!
//! ```ignore
//! let engine = KeyboardEngine::new(config.engine.clone());
//! let dispatcher = AllowNativeShortcuts::with_reserved(engine.clone(), &config.native_shortcuts);
//! let hotkeys = Hotkeys::mount(&dispatcher, &config.bindings, &handlers)?;
//!
//! engine.dispatch(&KeyEvent::down("g"));
//! ```

mod binding;
mod config;
mod defaults;
mod engine;
mod guard;
mod history;
mod hotkeys;
mod keycodes;
mod native;
mod sequence;
mod types;

pub use binding::{BindingId, Handler, Hotkey, HotkeyEvent};
pub use config::{EngineConfig, HotkeyError, HotkeysConfig};
pub use defaults::{
    default_native_shortcuts, get_default_config_yaml, load_default_config, merge_configs,
};
pub use engine::{Dispatcher, KeyEvent, KeyState, KeyboardEngine, Subscription};
pub use guard::SimulatedKeyGuard;
pub use history::{clear_after_completion, KeyHistory};
pub use hotkeys::Hotkeys;
pub use keycodes::{key_for_code, CODE_TO_KEY};
pub use native::AllowNativeShortcuts;
pub use sequence::{Chord, KeySequence};
pub use types::{Key, Modifiers};
