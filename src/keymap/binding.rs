//! Hotkey bindings: a key sequence paired with the handler it triggers

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::config::HotkeyError;
use super::sequence::{Chord, KeySequence};

/// Identifier of a binding, unique within one key map
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

impl BindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BindingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BindingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Details of the key event that completed a sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HotkeyEvent {
    /// The sequence of the binding being invoked
    pub sequence: KeySequence,
    /// The chord that completed the sequence
    pub chord: Chord,
    /// True if the engine synthesized this event from a physical one
    pub simulated: bool,
    /// Id of the physical key-down this event belongs to
    pub cycle: u64,
}

/// Action bound to a key sequence
///
/// Handlers are reference counted so wrappers and engine registrations
/// can share them. Everything runs on one thread.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&HotkeyEvent)>);

impl Handler {
    pub fn new(f: impl Fn(&HotkeyEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A handler that doesn't care about the triggering event
    pub fn from_fn(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(move |_| f()))
    }

    pub fn call(&self, event: &HotkeyEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// A parsed binding
#[derive(Clone, Debug)]
pub struct Hotkey {
    pub sequence: KeySequence,
    pub handler: Handler,
}

impl Hotkey {
    pub fn new(sequence: KeySequence, handler: Handler) -> Self {
        Self { sequence, handler }
    }

    /// Pair up a key map with its handlers and parse every sequence
    ///
    /// The two maps must have the same keys. That's checked before any
    /// sequence is parsed.
    pub fn zip(
        key_map: &BTreeMap<BindingId, String>,
        handlers: &BTreeMap<BindingId, Handler>,
    ) -> Result<BTreeMap<BindingId, Hotkey>, HotkeyError> {
        let missing_handlers: Vec<BindingId> = key_map
            .keys()
            .filter(|id| !handlers.contains_key(*id))
            .cloned()
            .collect();
        let missing_sequences: Vec<BindingId> = handlers
            .keys()
            .filter(|id| !key_map.contains_key(*id))
            .cloned()
            .collect();

        if !missing_handlers.is_empty() || !missing_sequences.is_empty() {
            return Err(HotkeyError::MismatchedBinding {
                missing_handlers,
                missing_sequences,
            });
        }

        key_map
            .iter()
            .map(|(id, sequence)| {
                let sequence = KeySequence::parse(sequence).map_err(|e| e.for_binding(id))?;
                Ok((id.clone(), Hotkey::new(sequence, handlers[id].clone())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_map(entries: &[(&str, &str)]) -> BTreeMap<BindingId, String> {
        entries
            .iter()
            .map(|(id, seq)| (BindingId::from(*id), seq.to_string()))
            .collect()
    }

    fn handlers(ids: &[&str]) -> BTreeMap<BindingId, Handler> {
        ids.iter()
            .map(|id| (BindingId::from(*id), Handler::from_fn(|| {})))
            .collect()
    }

    #[test]
    fn test_zip_parses_sequences() {
        let hotkeys = Hotkey::zip(
            &key_map(&[("down", "j"), ("top", "g g")]),
            &handlers(&["down", "top"]),
        )
        .unwrap();

        assert_eq!(hotkeys.len(), 2);
        assert!(!hotkeys[&BindingId::from("down")]
            .sequence
            .uses_multiple_chords());
        assert!(hotkeys[&BindingId::from("top")]
            .sequence
            .uses_multiple_chords());
    }

    #[test]
    fn test_zip_mismatched_keys() {
        let err = Hotkey::zip(
            &key_map(&[("down", "j"), ("up", "k")]),
            &handlers(&["down", "left"]),
        )
        .unwrap_err();

        match err {
            HotkeyError::MismatchedBinding {
                missing_handlers,
                missing_sequences,
            } => {
                assert_eq!(missing_handlers, vec![BindingId::from("up")]);
                assert_eq!(missing_sequences, vec![BindingId::from("left")]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_zip_mismatch_reported_before_parse_errors() {
        let err = Hotkey::zip(&key_map(&[("bad", "a+")]), &handlers(&[])).unwrap_err();
        assert!(matches!(err, HotkeyError::MismatchedBinding { .. }));
    }

    #[test]
    fn test_zip_malformed_names_binding() {
        let err = Hotkey::zip(&key_map(&[("bad", "a+")]), &handlers(&["bad"])).unwrap_err();
        assert!(matches!(err, HotkeyError::MalformedSequence { .. }));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_handler_from_fn_ignores_event() {
        use std::cell::Cell;

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let handler = Handler::from_fn(move || c.set(c.get() + 1));

        let event = HotkeyEvent {
            sequence: KeySequence::parse("j").unwrap(),
            chord: Chord::parse("j").unwrap(),
            simulated: false,
            cycle: 1,
        };
        handler.call(&event);
        handler.call(&event);
        assert_eq!(count.get(), 2);
    }
}
