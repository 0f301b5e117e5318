//! Hotkeys: the entry point that splits bindings into single- and multi-chord groups

use std::collections::BTreeMap;

use super::binding::{BindingId, Handler, Hotkey};
use super::config::HotkeyError;
use super::engine::{Dispatcher, Subscription};
use super::guard::SimulatedKeyGuard;
use super::history::{clear_after_completion, KeyHistory};

/// One engine registration and the history it owns
#[derive(Debug)]
struct Partition {
    bindings: Vec<BindingId>,
    history: KeyHistory,
    _subscription: Subscription,
}

impl Partition {
    fn register<D: Dispatcher + ?Sized>(
        dispatcher: &D,
        hotkeys: Vec<(BindingId, Hotkey)>,
        guard: &SimulatedKeyGuard,
    ) -> Self {
        let history = KeyHistory::new();
        let mut key_map = BTreeMap::new();
        let mut handlers = BTreeMap::new();
        let mut bindings = Vec::with_capacity(hotkeys.len());

        for (id, Hotkey { sequence, handler }) in hotkeys {
            // Guard outermost: a suppressed simulated press must not clear history either
            let handler = guard.guard(
                &sequence,
                clear_after_completion(&sequence, handler, &history),
            );
            key_map.insert(id.clone(), sequence.to_canonical_string());
            handlers.insert(id.clone(), handler);
            bindings.push(id);
        }

        let subscription = dispatcher.register(key_map, handlers, history.clone());
        Self {
            bindings,
            history,
            _subscription: subscription,
        }
    }
}

/// Mounted set of hotkeys
///
/// Single-chord bindings (`j`, `ctrl+u`) and multi-chord bindings (`g g`)
/// go to two separate registrations, each with its own key history. Mixing
/// both kinds in one history lets a sequence's pending chords leave keys
/// stuck for the single-chord bindings.
///
/// Dropping the value unregisters everything.
#[derive(Debug)]
pub struct Hotkeys {
    single_chord: Partition,
    multi_chord: Partition,
    guard: SimulatedKeyGuard,
    _release_observer: Subscription,
}

impl Hotkeys {
    /// Validate the bindings and register them with `dispatcher`
    ///
    /// `key_map` and `handlers` must have the same binding ids and every
    /// sequence must parse; otherwise nothing is registered.
    pub fn mount<D: Dispatcher + ?Sized>(
        dispatcher: &D,
        key_map: &BTreeMap<BindingId, String>,
        handlers: &BTreeMap<BindingId, Handler>,
    ) -> Result<Self, HotkeyError> {
        let hotkeys = Hotkey::zip(key_map, handlers)?;

        let (multi, single): (Vec<_>, Vec<_>) = hotkeys
            .into_iter()
            .partition(|(_, hotkey)| hotkey.sequence.uses_multiple_chords());

        tracing::debug!(
            "Mounting hotkeys: {} single-chord, {} multi-chord",
            single.len(),
            multi.len()
        );

        let guard = SimulatedKeyGuard::new();
        let single_chord = Partition::register(dispatcher, single, &guard);
        let multi_chord = Partition::register(dispatcher, multi, &guard);

        let release_guard = guard.clone();
        let release_observer =
            dispatcher.on_key_release(Box::new(move |cycle| release_guard.release_cycle(cycle)));

        Ok(Self {
            single_chord,
            multi_chord,
            guard,
            _release_observer: release_observer,
        })
    }

    /// Replace the whole binding set
    ///
    /// The new bindings are validated first; if that fails the current
    /// bindings stay registered.
    pub fn replace<D: Dispatcher + ?Sized>(
        &mut self,
        dispatcher: &D,
        key_map: &BTreeMap<BindingId, String>,
        handlers: &BTreeMap<BindingId, Handler>,
    ) -> Result<(), HotkeyError> {
        let next = Self::mount(dispatcher, key_map, handlers)?;
        tracing::debug!(
            "Replacing {} hotkeys",
            self.single_chord.bindings.len() + self.multi_chord.bindings.len()
        );
        *self = next;
        Ok(())
    }

    /// Unregister every binding
    pub fn unmount(self) {
        tracing::debug!(
            "Unmounting {} hotkeys",
            self.single_chord.bindings.len() + self.multi_chord.bindings.len()
        );
    }

    /// Single-chord binding ids handed to the dispatcher
    ///
    /// These are the requested bindings. A wrapping dispatcher such as
    /// [`AllowNativeShortcuts`](super::AllowNativeShortcuts) may still
    /// decline some of them.
    pub fn single_chord_bindings(&self) -> &[BindingId] {
        &self.single_chord.bindings
    }

    /// Multi-chord binding ids handed to the dispatcher, see
    /// [`single_chord_bindings`](Self::single_chord_bindings)
    pub fn multi_chord_bindings(&self) -> &[BindingId] {
        &self.multi_chord.bindings
    }

    pub fn single_chord_history(&self) -> &KeyHistory {
        &self.single_chord.history
    }

    pub fn multi_chord_history(&self) -> &KeyHistory {
        &self.multi_chord.history
    }

    pub fn guard(&self) -> &SimulatedKeyGuard {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every registration instead of listening for keys
    #[derive(Default)]
    struct RecordingDispatcher {
        calls: RefCell<Vec<Vec<(BindingId, String)>>>,
        active: Rc<RefCell<usize>>,
    }

    impl Dispatcher for RecordingDispatcher {
        fn register(
            &self,
            key_map: BTreeMap<BindingId, String>,
            _handlers: BTreeMap<BindingId, Handler>,
            _history: KeyHistory,
        ) -> Subscription {
            self.calls.borrow_mut().push(key_map.into_iter().collect());
            *self.active.borrow_mut() += 1;
            let active = self.active.clone();
            Subscription::new(move || *active.borrow_mut() -= 1)
        }
    }

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
    fn test_partitions_by_chord_count() {
        let dispatcher = RecordingDispatcher::default();
        let hotkeys = Hotkeys::mount(
            &dispatcher,
            &key_map(&[("a", "j"), ("b", "g g")]),
            &handlers(&["a", "b"]),
        )
        .unwrap();

        assert_eq!(hotkeys.single_chord_bindings(), &[BindingId::from("a")]);
        assert_eq!(hotkeys.multi_chord_bindings(), &[BindingId::from("b")]);

        let calls = dispatcher.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![(BindingId::from("a"), "j".to_string())]);
        assert_eq!(calls[1], vec![(BindingId::from("b"), "g g".to_string())]);
    }

    #[test]
    fn test_registers_canonical_strings() {
        let dispatcher = RecordingDispatcher::default();
        let _hotkeys = Hotkeys::mount(
            &dispatcher,
            &key_map(&[("half_page", "U+Control")]),
            &handlers(&["half_page"]),
        )
        .unwrap();

        let calls = dispatcher.calls.borrow();
        assert_eq!(calls[0][0].1, "ctrl+u");
    }

    #[test]
    fn test_empty_partition_still_registered() {
        let dispatcher = RecordingDispatcher::default();
        let _hotkeys =
            Hotkeys::mount(&dispatcher, &key_map(&[("a", "j")]), &handlers(&["a"])).unwrap();

        let calls = dispatcher.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].is_empty());
    }

    #[test]
    fn test_partitions_have_separate_histories() {
        let dispatcher = RecordingDispatcher::default();
        let hotkeys =
            Hotkeys::mount(&dispatcher, &key_map(&[("a", "j")]), &handlers(&["a"])).unwrap();

        hotkeys
            .single_chord_history()
            .press(crate::keymap::Key::new("j").unwrap());
        assert!(!hotkeys.single_chord_history().is_empty());
        assert!(hotkeys.multi_chord_history().is_empty());
    }

    #[test]
    fn test_mismatch_registers_nothing() {
        let dispatcher = RecordingDispatcher::default();
        let err = Hotkeys::mount(&dispatcher, &key_map(&[("a", "j")]), &handlers(&["b"]))
            .unwrap_err();

        assert!(matches!(err, HotkeyError::MismatchedBinding { .. }));
        assert!(dispatcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_malformed_registers_nothing() {
        let dispatcher = RecordingDispatcher::default();
        let err = Hotkeys::mount(
            &dispatcher,
            &key_map(&[("a", "j"), ("b", "a+")]),
            &handlers(&["a", "b"]),
        )
        .unwrap_err();

        assert!(matches!(err, HotkeyError::MalformedSequence { .. }));
        assert!(dispatcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_unmount_releases_both_registrations() {
        let dispatcher = RecordingDispatcher::default();
        let hotkeys = Hotkeys::mount(
            &dispatcher,
            &key_map(&[("a", "j"), ("b", "g g")]),
            &handlers(&["a", "b"]),
        )
        .unwrap();
        assert_eq!(*dispatcher.active.borrow(), 2);

        hotkeys.unmount();
        assert_eq!(*dispatcher.active.borrow(), 0);
    }

    #[test]
    fn test_replace_swaps_registrations() {
        let dispatcher = RecordingDispatcher::default();
        let mut hotkeys =
            Hotkeys::mount(&dispatcher, &key_map(&[("a", "j")]), &handlers(&["a"])).unwrap();

        hotkeys
            .replace(&dispatcher, &key_map(&[("b", "k")]), &handlers(&["b"]))
            .unwrap();

        assert_eq!(*dispatcher.active.borrow(), 2);
        assert_eq!(hotkeys.single_chord_bindings(), &[BindingId::from("b")]);
    }

    #[test]
    fn test_failed_replace_keeps_bindings() {
        let dispatcher = RecordingDispatcher::default();
        let mut hotkeys =
            Hotkeys::mount(&dispatcher, &key_map(&[("a", "j")]), &handlers(&["a"])).unwrap();

        let result = hotkeys.replace(&dispatcher, &key_map(&[("b", "")]), &handlers(&["b"]));

        assert!(result.is_err());
        assert_eq!(*dispatcher.active.borrow(), 2);
        assert_eq!(hotkeys.single_chord_bindings(), &[BindingId::from("a")]);
    }
}
