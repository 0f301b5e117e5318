//! Suppress the second invocation caused by a simulated key press

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::binding::{Handler, HotkeyEvent};
use super::sequence::KeySequence;

/// Blocks a simulated key press from re-running a handler its physical key already ran
///
/// Holding `ctrl` and pressing `u` makes the engine deliver the physical
/// key-down and then a simulated `ctrl+u` key press. Both complete a
/// `ctrl+u` binding. The guard remembers, per key sequence, which key-down
/// cycle last ran the handler physically and drops a simulated event from
/// that same cycle. A new press of the key starts a new cycle, so it is
/// never blocked.
#[derive(Clone, Debug, Default)]
pub struct SimulatedKeyGuard {
    handled: Rc<RefCell<HashMap<KeySequence, u64>>>,
}

impl SimulatedKeyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard(&self, sequence: &KeySequence, handler: Handler) -> Handler {
        let handled = self.handled.clone();
        let sequence = sequence.clone();
        Handler::new(move |event: &HotkeyEvent| {
            if event.simulated {
                if handled.borrow().get(&sequence) == Some(&event.cycle) {
                    tracing::trace!(
                        "Ignoring simulated '{}' already handled in cycle {}",
                        sequence,
                        event.cycle
                    );
                    return;
                }
            } else {
                handled.borrow_mut().insert(sequence.clone(), event.cycle);
            }
            handler.call(event);
        })
    }

    /// Drop the records left by a key-down cycle once its key is released
    pub fn release_cycle(&self, cycle: u64) {
        self.handled.borrow_mut().retain(|_, c| *c != cycle);
    }

    /// Number of sequences with an active suppression record
    pub fn active_records(&self) -> usize {
        self.handled.borrow().len()
    }
}
