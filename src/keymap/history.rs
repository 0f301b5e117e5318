//! Key press history shared between an engine registration and the hotkeys that clear it

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::binding::{Handler, HotkeyEvent};
use super::sequence::{Chord, KeySequence};
use super::types::Key;

#[derive(Debug, Default)]
struct HistoryBuffer {
    /// Keys currently held down
    held: BTreeSet<Key>,
    /// Chords pressed since the last clear, oldest first
    chords: Vec<Chord>,
    /// Whether the last chord can still grow (no key released since it started)
    chord_open: bool,
    /// Maximum number of chords kept; 0 means unbounded
    capacity: usize,
}

impl HistoryBuffer {
    fn record_held(&mut self) -> Option<Chord> {
        let chord = Chord::from_keys(self.held.iter().cloned())?;
        if self.chord_open && !self.chords.is_empty() {
            let last = self.chords.len() - 1;
            self.chords[last] = chord.clone();
        } else {
            self.chords.push(chord.clone());
            if self.capacity > 0 && self.chords.len() > self.capacity {
                let excess = self.chords.len() - self.capacity;
                self.chords.drain(..excess);
            }
        }
        self.chord_open = true;
        Some(chord)
    }
}

/// Recent key presses for one group of registered bindings
///
/// A key-down extends the chord being pressed; any key-up closes it, so the
/// next key-down starts a new chord from whatever is still held. `g` `g`
/// therefore records two chords while `shift` + `j` records one.
///
/// Cloning gives another handle to the same buffer.
#[derive(Clone, Debug, Default)]
pub struct KeyHistory(Rc<RefCell<HistoryBuffer>>);

impl KeyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down and return the chord now being pressed
    pub fn press(&self, key: Key) -> Chord {
        let mut buffer = self.0.borrow_mut();
        buffer.held.insert(key);
        buffer
            .record_held()
            .expect("held keys include the key just pressed")
    }

    /// Record the currently held keys again without a new key-down
    ///
    /// Used for simulated key presses, which re-enter the chord that is
    /// already held. Returns `None` if nothing is held.
    pub fn press_held(&self) -> Option<Chord> {
        self.0.borrow_mut().record_held()
    }

    /// Record a key-up. Returns false if the key wasn't held.
    pub fn release(&self, key: &Key) -> bool {
        let mut buffer = self.0.borrow_mut();
        buffer.chord_open = false;
        buffer.held.remove(key)
    }

    pub fn chords(&self) -> Vec<Chord> {
        self.0.borrow().chords.clone()
    }

    pub fn held(&self) -> Vec<Key> {
        self.0.borrow().held.iter().cloned().collect()
    }

    pub fn is_held(&self, key: &Key) -> bool {
        self.0.borrow().held.contains(key)
    }

    /// Check whether `sequence` matches the most recent chords
    pub fn ends_with(&self, sequence: &KeySequence) -> bool {
        sequence.is_suffix_of(&self.0.borrow().chords)
    }

    /// Forget recorded chords, keeping track of keys still held
    pub fn clear(&self) {
        let mut buffer = self.0.borrow_mut();
        buffer.chords.clear();
        buffer.chord_open = false;
    }

    /// Forget everything, including held keys (focus loss)
    pub fn reset(&self) {
        let mut buffer = self.0.borrow_mut();
        buffer.chords.clear();
        buffer.held.clear();
        buffer.chord_open = false;
    }

    /// Bound the number of chords kept; 0 means unbounded
    pub fn set_capacity(&self, capacity: usize) {
        self.0.borrow_mut().capacity = capacity;
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().chords.is_empty()
    }
}

/// Wrap `handler` so the history is cleared once the sequence completes
///
/// Without this, the trailing chords of a finished sequence stay in the
/// history and can combine with later presses: after `g g` fires, one more
/// `g` would complete `g g` again.
pub fn clear_after_completion(
    sequence: &KeySequence,
    handler: Handler,
    history: &KeyHistory,
) -> Handler {
    let sequence = sequence.clone();
    let history = history.clone();
    Handler::new(move |event: &HotkeyEvent| {
        handler.call(event);
        tracing::trace!("Sequence '{}' completed, clearing key history", sequence);
        history.clear();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(name: &str) -> Key {
        Key::new(name).unwrap()
    }

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    fn seq(s: &str) -> KeySequence {
        KeySequence::parse(s).unwrap()
    }

    #[test]
    fn test_repeated_key_records_separate_chords() {
        let history = KeyHistory::new();
        history.press(key("g"));
        history.release(&key("g"));
        history.press(key("g"));

        assert_eq!(history.chords(), vec![chord("g"), chord("g")]);
        assert!(history.ends_with(&seq("g g")));
    }

    #[test]
    fn test_held_keys_form_one_chord() {
        let history = KeyHistory::new();
        history.press(key("shift"));
        let current = history.press(key("j"));

        assert_eq!(current, chord("shift+j"));
        assert_eq!(history.chords(), vec![chord("shift+j")]);
    }

    #[test]
    fn test_modifier_held_across_chords() {
        let history = KeyHistory::new();
        history.press(key("ctrl"));
        history.press(key("k"));
        history.release(&key("k"));
        history.press(key("c"));

        assert!(history.ends_with(&seq("ctrl+k ctrl+c")));
    }

    #[test]
    fn test_press_held_reopens_after_clear() {
        let history = KeyHistory::new();
        history.press(key("ctrl"));
        history.press(key("u"));
        history.clear();
        assert!(history.is_empty());

        assert_eq!(history.press_held(), Some(chord("ctrl+u")));
        assert_eq!(history.chords(), vec![chord("ctrl+u")]);
    }

    #[test]
    fn test_press_held_does_not_duplicate_open_chord() {
        let history = KeyHistory::new();
        history.press(key("ctrl"));
        history.press(key("u"));
        history.press_held();

        assert_eq!(history.chords(), vec![chord("ctrl+u")]);
    }

    #[test]
    fn test_clear_keeps_held_keys() {
        let history = KeyHistory::new();
        history.press(key("ctrl"));
        history.clear();

        assert!(history.is_held(&key("ctrl")));
        assert_eq!(history.press(key("u")), chord("ctrl+u"));
    }

    #[test]
    fn test_reset_forgets_held_keys() {
        let history = KeyHistory::new();
        history.press(key("ctrl"));
        history.press(key("g"));
        history.reset();

        assert!(history.held().is_empty());
        assert!(history.is_empty());
        assert!(!history.release(&key("ctrl")));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let history = KeyHistory::new();
        history.set_capacity(2);
        for name in ["a", "b", "c"] {
            history.press(key(name));
            history.release(&key(name));
        }

        assert_eq!(history.chords(), vec![chord("b"), chord("c")]);
    }

    #[test]
    fn test_clear_after_completion() {
        let history = KeyHistory::new();
        history.press(key("g"));
        history.release(&key("g"));
        history.press(key("g"));

        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let sequence = seq("g g");
        let wrapped =
            clear_after_completion(&sequence, Handler::from_fn(move || c.set(c.get() + 1)), &history);

        wrapped.call(&HotkeyEvent {
            sequence: sequence.clone(),
            chord: chord("g"),
            simulated: false,
            cycle: 2,
        });

        assert_eq!(calls.get(), 1);
        assert!(history.is_empty());
        assert!(history.is_held(&key("g")));
    }

    #[test]
    fn test_handler_sees_history_before_clear() {
        let history = KeyHistory::new();
        history.press(key("j"));

        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let h = history.clone();
        let sequence = seq("j");
        let wrapped = clear_after_completion(
            &sequence,
            Handler::from_fn(move || s.set(h.chords().len())),
            &history,
        );

        wrapped.call(&HotkeyEvent {
            sequence,
            chord: chord("j"),
            simulated: false,
            cycle: 1,
        });

        assert_eq!(seen.get(), 1);
        assert!(history.is_empty());
    }
}
