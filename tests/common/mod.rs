//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use hotkeys::keymap::{BindingId, Handler, HotkeyEvent};

/// Ids and events of every handler call, in order
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<(String, HotkeyEvent)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One recording handler per id
    pub fn handlers(&self, ids: &[&str]) -> BTreeMap<BindingId, Handler> {
        ids.iter()
            .map(|id| {
                let calls = self.calls.clone();
                let name = id.to_string();
                (
                    BindingId::from(*id),
                    Handler::new(move |event| calls.borrow_mut().push((name.clone(), event.clone()))),
                )
            })
            .collect()
    }

    /// Ids fired since the last call
    pub fn take(&self) -> Vec<String> {
        self.calls
            .borrow_mut()
            .drain(..)
            .map(|(id, _)| id)
            .collect()
    }

    /// Events fired since the last call
    pub fn take_events(&self) -> Vec<(String, HotkeyEvent)> {
        self.calls.borrow_mut().drain(..).collect()
    }
}

/// Build a key map from `(id, sequence)` pairs
pub fn key_map(entries: &[(&str, &str)]) -> BTreeMap<BindingId, String> {
    entries
        .iter()
        .map(|(id, seq)| (BindingId::from(*id), seq.to_string()))
        .collect()
}
