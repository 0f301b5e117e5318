//! Hotkey dispatch: the registration capability and a keyboard engine implementing it
//!
//! ```text
//! KeyEvent → KeyboardEngine::dispatch() → KeyHistory (per registration)
//!          → bindings whose sequence ends the history → Handler
//! ```
//!
//! Every physical key-down is offered to all registrations before any
//! simulated key press derived from it. The simulated-key guard relies on
//! that order.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use super::binding::{BindingId, Handler, HotkeyEvent};
use super::config::EngineConfig;
use super::history::KeyHistory;
use super::keycodes::key_for_code;
use super::sequence::{Chord, KeySequence};
use super::types::Key;

/// Whether a key went down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    Down,
    Up,
}

/// A raw keyboard event as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Logical key value, e.g. `"J"`, `"!"`, `"Shift"`
    pub key: String,
    /// Physical key code, e.g. `"KeyJ"`, `"Digit1"`
    #[serde(default)]
    pub code: Option<String>,
    pub state: KeyState,
    /// Auto-repeat while the key is held
    #[serde(default)]
    pub repeat: bool,
    /// Tag name of the focused element
    #[serde(default)]
    pub target: Option<String>,
}

impl KeyEvent {
    pub fn down(key: &str) -> Self {
        Self {
            key: key.to_string(),
            code: None,
            state: KeyState::Down,
            repeat: false,
            target: None,
        }
    }

    pub fn up(key: &str) -> Self {
        Self {
            state: KeyState::Up,
            ..Self::down(key)
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn with_target(mut self, tag: &str) -> Self {
        self.target = Some(tag.to_string());
        self
    }
}

/// Handle to a registration; dropping it unregisters
#[must_use = "dropping a Subscription unregisters it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release
    pub fn none() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Capability that subscribes a group of hotkeys to key events
///
/// `key_map` holds canonical key sequence strings. Each registration keeps
/// its key history in `history`, which the caller owns and may clear.
pub trait Dispatcher {
    fn register(
        &self,
        key_map: BTreeMap<BindingId, String>,
        handlers: BTreeMap<BindingId, Handler>,
        history: KeyHistory,
    ) -> Subscription;

    /// Observe key releases; the observer receives the released key's cycle id
    fn on_key_release(&self, _observer: Box<dyn Fn(u64)>) -> Subscription {
        Subscription::none()
    }
}

struct Registration {
    id: u64,
    bindings: Vec<(BindingId, KeySequence, Handler)>,
    history: KeyHistory,
}

type ReleaseObserver = Rc<dyn Fn(u64)>;

struct EngineState {
    config: EngineConfig,
    registrations: Vec<Registration>,
    release_observers: Vec<(u64, ReleaseObserver)>,
    next_id: u64,
    next_cycle: u64,
    /// Key-down cycle of each held key
    cycles: HashMap<Key, u64>,
}

impl EngineState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn snapshot(&self) -> Vec<(KeyHistory, Vec<(KeySequence, Handler)>)> {
        self.registrations
            .iter()
            .map(|r| {
                let bindings = r
                    .bindings
                    .iter()
                    .map(|(_, sequence, handler)| (sequence.clone(), handler.clone()))
                    .collect();
                (r.history.clone(), bindings)
            })
            .collect()
    }
}

/// Keyboard engine matching key histories against registered sequences
///
/// Cloning gives another handle to the same engine. Handlers run
/// synchronously inside [`dispatch`](Self::dispatch); no engine state is
/// borrowed while they run, so a handler may register or unregister
/// hotkeys.
#[derive(Clone)]
pub struct KeyboardEngine {
    state: Rc<RefCell<EngineState>>,
}

impl KeyboardEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(EngineState {
                config,
                registrations: Vec::new(),
                release_observers: Vec::new(),
                next_id: 0,
                next_cycle: 0,
                cycles: HashMap::new(),
            })),
        }
    }

    /// Number of active registrations
    pub fn registration_count(&self) -> usize {
        self.state.borrow().registrations.len()
    }

    /// Binding ids of every active registration, in registration order
    pub fn registered_bindings(&self) -> Vec<Vec<BindingId>> {
        self.state
            .borrow()
            .registrations
            .iter()
            .map(|r| r.bindings.iter().map(|(id, _, _)| id.clone()).collect())
            .collect()
    }

    /// Handle one key event. Returns true if any handler ran.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        let Some(key) = self.identify(event) else {
            return false;
        };

        match event.state {
            KeyState::Down => {
                if self.is_ignored_target(event) {
                    tracing::trace!("Ignoring '{}' from <{:?}>", key, event.target);
                    return false;
                }
                self.key_down(key, event.repeat)
            }
            // Releases always count, wherever they happen
            KeyState::Up => {
                self.key_up(&key);
                false
            }
        }
    }

    /// Window lost focus: forget every held key and in-progress sequence
    pub fn blur(&self) {
        let (histories, cycles, observers) = {
            let mut state = self.state.borrow_mut();
            let histories: Vec<KeyHistory> = state
                .registrations
                .iter()
                .map(|r| r.history.clone())
                .collect();
            let cycles: Vec<u64> = state.cycles.drain().map(|(_, cycle)| cycle).collect();
            let observers: Vec<ReleaseObserver> = state
                .release_observers
                .iter()
                .map(|(_, o)| o.clone())
                .collect();
            (histories, cycles, observers)
        };

        tracing::debug!("Focus lost, resetting {} key histories", histories.len());
        for history in &histories {
            history.reset();
        }
        for cycle in cycles {
            for observer in &observers {
                observer(cycle);
            }
        }
    }

    /// Resolve the key identity of an event
    fn identify(&self, event: &KeyEvent) -> Option<Key> {
        let normalize = self.state.borrow().config.normalize_key_codes;
        if normalize {
            if let Some(key) = event.code.as_deref().and_then(key_for_code) {
                return Some(key);
            }
        }
        Key::new(&event.key)
    }

    fn is_ignored_target(&self, event: &KeyEvent) -> bool {
        let Some(target) = event.target.as_deref() else {
            return false;
        };
        self.state
            .borrow()
            .config
            .ignore_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(target))
    }

    fn key_down(&self, key: Key, repeat: bool) -> bool {
        let (cycle, registrations, config) = {
            let mut state = self.state.borrow_mut();
            if repeat && state.config.ignore_repeated_events_when_key_held_down {
                return false;
            }

            let existing = if repeat {
                state.cycles.get(&key).copied()
            } else {
                None
            };
            let cycle = match existing {
                Some(cycle) => cycle,
                None => {
                    state.next_cycle += 1;
                    let cycle = state.next_cycle;
                    state.cycles.insert(key.clone(), cycle);
                    cycle
                }
            };
            (cycle, state.snapshot(), state.config.clone())
        };

        let mut handled = false;

        // Physical key-down, offered to every registration first
        for (history, bindings) in &registrations {
            let chord = if repeat {
                match history.press_held() {
                    Some(chord) => chord,
                    None => history.press(key.clone()),
                }
            } else {
                history.press(key.clone())
            };

            let matched: Vec<_> = bindings
                .iter()
                .filter(|(sequence, _)| history.ends_with(sequence))
                .collect();
            if run_handlers(&matched, &chord, false, cycle) {
                handled = true;
                if config.stop_event_propagation_after_handling {
                    break;
                }
            }
        }

        // Simulated key press for chords the browser never reports one for
        if config.simulate_missing_key_press_events
            && !(handled && config.stop_event_propagation_after_handling)
        {
            for (history, bindings) in &registrations {
                let Some(chord) = Chord::from_keys(history.held()) else {
                    continue;
                };
                if !(chord.modifiers().suppresses_key_press() && chord.has_plain_key()) {
                    continue;
                }

                // A history cleared by a completed sequence still sees the held chord
                let mut recent = history.chords();
                if recent.is_empty() {
                    recent.push(chord.clone());
                }
                let matched: Vec<_> = bindings
                    .iter()
                    .filter(|(sequence, _)| sequence.is_suffix_of(&recent))
                    .collect();
                if run_handlers(&matched, &chord, true, cycle) {
                    handled = true;
                    if config.stop_event_propagation_after_handling {
                        break;
                    }
                }
            }
        }

        handled
    }

    fn key_up(&self, key: &Key) {
        let (histories, cycle, observers) = {
            let mut state = self.state.borrow_mut();
            let histories: Vec<KeyHistory> = state
                .registrations
                .iter()
                .map(|r| r.history.clone())
                .collect();
            let cycle = state.cycles.remove(key);
            let observers: Vec<ReleaseObserver> = state
                .release_observers
                .iter()
                .map(|(_, o)| o.clone())
                .collect();
            (histories, cycle, observers)
        };

        for history in &histories {
            history.release(key);
        }

        if let Some(cycle) = cycle {
            for observer in &observers {
                observer(cycle);
            }
        }
    }
}

fn run_handlers(
    matched: &[&(KeySequence, Handler)],
    chord: &Chord,
    simulated: bool,
    cycle: u64,
) -> bool {
    for (sequence, handler) in matched {
        tracing::trace!(
            "Matched '{}' (simulated: {}, cycle {})",
            sequence,
            simulated,
            cycle
        );
        handler.call(&HotkeyEvent {
            sequence: sequence.clone(),
            chord: chord.clone(),
            simulated,
            cycle,
        });
    }
    !matched.is_empty()
}

fn unregister(state: &Weak<RefCell<EngineState>>, id: u64) {
    if let Some(state) = state.upgrade() {
        state.borrow_mut().registrations.retain(|r| r.id != id);
    }
}

impl Dispatcher for KeyboardEngine {
    fn register(
        &self,
        key_map: BTreeMap<BindingId, String>,
        mut handlers: BTreeMap<BindingId, Handler>,
        history: KeyHistory,
    ) -> Subscription {
        let mut bindings = Vec::with_capacity(key_map.len());
        for (id, sequence) in key_map {
            let Some(handler) = handlers.remove(&id) else {
                tracing::warn!("No handler for '{}', skipping", id);
                continue;
            };
            match KeySequence::parse(&sequence) {
                Ok(sequence) => bindings.push((id, sequence, handler)),
                Err(e) => tracing::warn!("Skipping '{}': {}", id, e),
            }
        }

        let longest = bindings
            .iter()
            .map(|(_, sequence, _)| sequence.len())
            .max()
            .unwrap_or(1);
        history.set_capacity(longest);

        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.allocate_id();
            tracing::debug!("Registering {} hotkeys (registration {})", bindings.len(), id);
            state.registrations.push(Registration {
                id,
                bindings,
                history,
            });
            id
        };

        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            tracing::debug!("Unregistering registration {}", id);
            unregister(&weak, id);
        })
    }

    fn on_key_release(&self, observer: Box<dyn Fn(u64)>) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.allocate_id();
            state.release_observers.push((id, Rc::from(observer)));
            id
        };

        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .borrow_mut()
                    .release_observers
                    .retain(|(observer_id, _)| *observer_id != id);
            }
        })
    }
}

impl Default for KeyboardEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<D: Dispatcher + ?Sized> Dispatcher for Rc<D> {
    fn register(
        &self,
        key_map: BTreeMap<BindingId, String>,
        handlers: BTreeMap<BindingId, Handler>,
        history: KeyHistory,
    ) -> Subscription {
        (**self).register(key_map, handlers, history)
    }

    fn on_key_release(&self, observer: Box<dyn Fn(u64)>) -> Subscription {
        (**self).on_key_release(observer)
    }
}
