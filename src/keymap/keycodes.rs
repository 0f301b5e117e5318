//! Physical key code table
//!
//! Maps `KeyboardEvent.code` values (the physical key) to the logical key
//! name used in key sequences. Looking keys up by physical code makes `J`
//! and `j`, or `!` and `1`, the same key, so a key-down recorded with shift
//! held is released by a key-up recorded without it.

use super::types::Key;

/// Physical key code → logical key name
pub const CODE_TO_KEY: &[(&str, &str)] = &[
    // Letters
    ("KeyA", "a"),
    ("KeyB", "b"),
    ("KeyC", "c"),
    ("KeyD", "d"),
    ("KeyE", "e"),
    ("KeyF", "f"),
    ("KeyG", "g"),
    ("KeyH", "h"),
    ("KeyI", "i"),
    ("KeyJ", "j"),
    ("KeyK", "k"),
    ("KeyL", "l"),
    ("KeyM", "m"),
    ("KeyN", "n"),
    ("KeyO", "o"),
    ("KeyP", "p"),
    ("KeyQ", "q"),
    ("KeyR", "r"),
    ("KeyS", "s"),
    ("KeyT", "t"),
    ("KeyU", "u"),
    ("KeyV", "v"),
    ("KeyW", "w"),
    ("KeyX", "x"),
    ("KeyY", "y"),
    ("KeyZ", "z"),
    // Digit row
    ("Digit0", "0"),
    ("Digit1", "1"),
    ("Digit2", "2"),
    ("Digit3", "3"),
    ("Digit4", "4"),
    ("Digit5", "5"),
    ("Digit6", "6"),
    ("Digit7", "7"),
    ("Digit8", "8"),
    ("Digit9", "9"),
    // Punctuation
    ("Backquote", "`"),
    ("Minus", "-"),
    ("Equal", "="),
    ("BracketLeft", "["),
    ("BracketRight", "]"),
    ("Backslash", "\\"),
    ("Semicolon", ";"),
    ("Quote", "'"),
    ("Comma", ","),
    ("Period", "."),
    ("Slash", "/"),
    // Modifiers (left and right collapse to one key)
    ("ShiftLeft", "shift"),
    ("ShiftRight", "shift"),
    ("ControlLeft", "ctrl"),
    ("ControlRight", "ctrl"),
    ("AltLeft", "alt"),
    ("AltRight", "alt"),
    ("MetaLeft", "meta"),
    ("MetaRight", "meta"),
    ("OSLeft", "meta"),
    ("OSRight", "meta"),
    // Named keys
    ("Enter", "enter"),
    ("Escape", "escape"),
    ("Tab", "tab"),
    ("Backspace", "backspace"),
    ("Delete", "delete"),
    ("Space", "space"),
    ("CapsLock", "capslock"),
    ("ArrowUp", "up"),
    ("ArrowDown", "down"),
    ("ArrowLeft", "left"),
    ("ArrowRight", "right"),
    ("Home", "home"),
    ("End", "end"),
    ("PageUp", "pageup"),
    ("PageDown", "pagedown"),
    ("Insert", "insert"),
    // Function keys
    ("F1", "f1"),
    ("F2", "f2"),
    ("F3", "f3"),
    ("F4", "f4"),
    ("F5", "f5"),
    ("F6", "f6"),
    ("F7", "f7"),
    ("F8", "f8"),
    ("F9", "f9"),
    ("F10", "f10"),
    ("F11", "f11"),
    ("F12", "f12"),
    // Numpad
    ("Numpad0", "num0"),
    ("Numpad1", "num1"),
    ("Numpad2", "num2"),
    ("Numpad3", "num3"),
    ("Numpad4", "num4"),
    ("Numpad5", "num5"),
    ("Numpad6", "num6"),
    ("Numpad7", "num7"),
    ("Numpad8", "num8"),
    ("Numpad9", "num9"),
    ("NumpadAdd", "numadd"),
    ("NumpadSubtract", "numsub"),
    ("NumpadMultiply", "nummul"),
    ("NumpadDivide", "numdiv"),
    ("NumpadEnter", "numenter"),
    ("NumpadDecimal", "numdot"),
];

/// Look up the logical key for a physical key code
pub fn key_for_code(code: &str) -> Option<Key> {
    CODE_TO_KEY
        .iter()
        .find(|(c, _)| *c == code)
        .and_then(|(_, name)| Key::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_codes() {
        assert_eq!(key_for_code("KeyJ"), Key::new("j"));
        assert_eq!(key_for_code("KeyA"), Key::new("a"));
    }

    #[test]
    fn test_shifted_digit_maps_to_digit() {
        assert_eq!(key_for_code("Digit1"), Key::new("1"));
    }

    #[test]
    fn test_left_and_right_modifiers_collapse() {
        assert_eq!(key_for_code("ShiftLeft"), key_for_code("ShiftRight"));
        assert_eq!(key_for_code("ControlRight"), Key::new("ctrl"));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(key_for_code("IntlYen"), None);
    }

    #[test]
    fn test_table_has_no_duplicate_codes() {
        let mut codes: Vec<_> = CODE_TO_KEY.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        let before = codes.len();
        codes.dedup();
        assert_eq!(before, codes.len());
    }
}
