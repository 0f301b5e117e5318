//! Key sequences: ordered lists of chords parsed from strings like `"g g"` or `"ctrl+u"`

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::config::HotkeyError;
use super::types::{Key, Modifiers};

/// A set of keys held down together, e.g. `ctrl+u`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord(BTreeSet<Key>);

impl Chord {
    /// Build a chord from already-normalized keys. Returns `None` if empty.
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Option<Self> {
        let keys: BTreeSet<Key> = keys.into_iter().collect();
        if keys.is_empty() {
            None
        } else {
            Some(Chord(keys))
        }
    }

    /// Parse a single `+`-joined chord token
    pub fn parse(token: &str) -> Result<Self, HotkeyError> {
        let mut keys = BTreeSet::new();
        for name in token.split('+') {
            let key = Key::new(name).ok_or_else(|| HotkeyError::MalformedSequence {
                input: token.to_string(),
                reason: "empty key name in chord".to_string(),
            })?;
            keys.insert(key);
        }
        Ok(Chord(keys))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Modifiers held in this chord
    pub fn modifiers(&self) -> Modifiers {
        self.0
            .iter()
            .filter_map(Key::modifier)
            .fold(Modifiers::NONE, Modifiers::union)
    }

    /// True if the chord holds at least one key that isn't a modifier
    pub fn has_plain_key(&self) -> bool {
        self.0.iter().any(|k| !k.is_modifier())
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

/// An ordered, non-empty sequence of chords pressed one after another
///
/// `"g g"` is two chords, `"ctrl+u"` is one. The canonical string form
/// (see [`KeySequence::to_canonical_string`]) is what gets handed to the
/// dispatch engine and is also the serde representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySequence {
    chords: Vec<Chord>,
}

impl KeySequence {
    /// Parse a whitespace-separated list of `+`-joined chords
    pub fn parse(input: &str) -> Result<Self, HotkeyError> {
        let chords = input
            .split_whitespace()
            .map(|token| {
                Chord::parse(token).map_err(|_| HotkeyError::MalformedSequence {
                    input: input.to_string(),
                    reason: format!("empty key name in chord '{}'", token),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if chords.is_empty() {
            return Err(HotkeyError::MalformedSequence {
                input: input.to_string(),
                reason: "no chords".to_string(),
            });
        }

        Ok(Self { chords })
    }

    /// True if more than one chord must be pressed in order
    pub fn uses_multiple_chords(&self) -> bool {
        self.chords.len() > 1
    }

    /// The textual form expected by the dispatch engine
    ///
    /// Chord order is preserved; keys inside a chord are modifiers first,
    /// then by name.
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Always false; sequences can't be constructed empty
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn first(&self) -> &Chord {
        &self.chords[0]
    }

    pub fn last(&self) -> &Chord {
        &self.chords[self.chords.len() - 1]
    }

    /// Check whether this sequence equals the tail of `history`
    pub fn is_suffix_of(&self, history: &[Chord]) -> bool {
        history.ends_with(&self.chords)
    }

    /// Check whether any chord of this sequence is in `chords`
    pub fn contains_any(&self, chords: &[Chord]) -> bool {
        self.chords.iter().any(|c| chords.contains(c))
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chord) in self.chords.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", chord)?;
        }
        Ok(())
    }
}

impl FromStr for KeySequence {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for KeySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeySequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
