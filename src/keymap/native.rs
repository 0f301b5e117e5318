//! Keep browser/OS shortcuts such as save and print out of the hotkey engine

use std::collections::BTreeMap;

use super::binding::{BindingId, Handler};
use super::defaults::default_native_shortcuts;
use super::engine::{Dispatcher, Subscription};
use super::history::KeyHistory;
use super::sequence::{Chord, KeySequence};

/// Dispatcher wrapper that never registers bindings using a reserved chord
///
/// A binding whose sequence contains a reserved chord (say `cmd+s`) is
/// dropped before it reaches the wrapped dispatcher, so the key event is
/// left alone and the native action runs.
pub struct AllowNativeShortcuts<D> {
    inner: D,
    reserved: Vec<Chord>,
}

impl<D> AllowNativeShortcuts<D> {
    /// Wrap `inner`, reserving the default native shortcuts
    pub fn new(inner: D) -> Self {
        Self::with_reserved(inner, &default_native_shortcuts())
    }

    pub fn with_reserved(inner: D, reserved: &[KeySequence]) -> Self {
        let mut chords: Vec<Chord> = reserved
            .iter()
            .flat_map(|sequence| sequence.chords().iter().cloned())
            .collect();
        chords.sort();
        chords.dedup();
        Self {
            inner,
            reserved: chords,
        }
    }

    pub fn is_reserved(&self, sequence: &KeySequence) -> bool {
        sequence.contains_any(&self.reserved)
    }
}

impl<D: Dispatcher> Dispatcher for AllowNativeShortcuts<D> {
    fn register(
        &self,
        mut key_map: BTreeMap<BindingId, String>,
        mut handlers: BTreeMap<BindingId, Handler>,
        history: KeyHistory,
    ) -> Subscription {
        key_map.retain(|id, sequence| {
            // Unparseable entries are the wrapped dispatcher's problem
            let Ok(parsed) = KeySequence::parse(sequence) else {
                return true;
            };
            if self.is_reserved(&parsed) {
                tracing::debug!(
                    "Not capturing '{}' ({}): reserved native shortcut",
                    parsed,
                    id
                );
                handlers.remove(id);
                return false;
            }
            true
        });

        self.inner.register(key_map, handlers, history)
    }

    fn on_key_release(&self, observer: Box<dyn Fn(u64)>) -> Subscription {
        self.inner.on_key_release(observer)
    }
}
