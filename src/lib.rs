//! Keyboard shortcuts on top of a hotkey engine
//!
//! Bindings map an id to a key sequence such as `"j"`, `"ctrl+u"` or
//! `"g g"`. See [`keymap`] for the moving parts.

pub mod config_paths;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use keymap::{
    AllowNativeShortcuts, BindingId, Handler, HotkeyError, Hotkeys, HotkeysConfig, KeyEvent,
    KeySequence, KeyboardEngine,
};
