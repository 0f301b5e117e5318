//! Core types for the keymap system: Key and Modifiers

use std::cmp::Ordering;
use std::fmt;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const ALT: Modifiers = Modifiers(0b0010);
    pub const SHIFT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & Self::CTRL.0 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    /// Check if alt/option is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    /// Check if meta (cmd/win) is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & Self::META.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// True when a modifier that suppresses the browser's key press event is held
    ///
    /// Shift alone still produces a printable character, so it doesn't count.
    #[inline]
    pub const fn suppresses_key_press(self) -> bool {
        self.ctrl() || self.alt() || self.meta()
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A normalized key name such as `ctrl`, `g` or `escape`
///
/// Names are lowercased and common aliases are folded, so `Control`,
/// `control` and `ctrl` are the same key. Keys order modifiers first
/// (`ctrl`, `alt`, `shift`, `meta`) and everything else by name, which
/// makes the `+`-joined form of a chord deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Normalize a key name. Returns `None` for an empty name.
    pub fn new(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        // A lone space is the space bar, not whitespace to trim
        if name == " " {
            return Some(Key("space".to_string()));
        }

        let lower = name.trim().to_lowercase();
        let canonical = match lower.as_str() {
            "" => return None,
            "cmd" | "mod" => {
                if cfg!(target_os = "macos") {
                    "meta"
                } else {
                    "ctrl"
                }
            }
            "control" => "ctrl",
            "option" | "opt" => "alt",
            "command" | "super" | "win" | "os" => "meta",
            "esc" => "escape",
            "return" => "enter",
            "del" => "delete",
            "ins" => "insert",
            "back" => "backspace",
            "spacebar" => "space",
            "arrowup" => "up",
            "arrowdown" => "down",
            "arrowleft" => "left",
            "arrowright" => "right",
            "pgup" => "pageup",
            "pgdown" | "pgdn" => "pagedown",
            other => other,
        };

        Some(Key(canonical.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The modifier this key represents, if any
    pub fn modifier(&self) -> Option<Modifiers> {
        match self.0.as_str() {
            "ctrl" => Some(Modifiers::CTRL),
            "alt" => Some(Modifiers::ALT),
            "shift" => Some(Modifiers::SHIFT),
            "meta" => Some(Modifiers::META),
            _ => None,
        }
    }

    pub fn is_modifier(&self) -> bool {
        self.modifier().is_some()
    }

    fn rank(&self) -> u8 {
        match self.0.as_str() {
            "ctrl" => 0,
            "alt" => 1,
            "shift" => 2,
            "meta" => 3,
            _ => 4,
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
