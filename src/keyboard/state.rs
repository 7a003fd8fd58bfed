//! Currently held keys and their repeat counters

use super::{KeyEvent, KeyState};
use std::collections::BTreeMap;

/// Snapshot of held keys: key name -> repeat counter
pub type ActiveKeys = BTreeMap<String, u32>;

/// Outcome of applying a key event to the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event was recorded and should be reported
    Applied,
    /// A repeat for a key that is not held; nothing was recorded
    Ignored,
}

/// Mapping of held keys to repeat counters.
///
/// A key is present exactly while it is held: inserted on `Down`, counted up
/// on `Hold`, removed on `Up`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveKeySet {
    keys: ActiveKeys,
}

impl ActiveKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded key event and update state
    pub fn apply(&mut self, event: &KeyEvent) -> Transition {
        match event.key_state {
            KeyState::Down => {
                // A second Down without an Up keeps the existing counter
                self.keys.entry(event.key_name.to_string()).or_insert(1);
                Transition::Applied
            }
            KeyState::Hold => match self.keys.get_mut(event.key_name) {
                Some(count) => {
                    *count = count.saturating_add(1);
                    Transition::Applied
                }
                None => Transition::Ignored,
            },
            KeyState::Up => {
                self.keys.remove(event.key_name);
                Transition::Applied
            }
        }
    }

    /// Repeat counter of a held key
    pub fn count(&self, key_name: &str) -> Option<u32> {
        self.keys.get(key_name).copied()
    }

    pub fn is_held(&self, key_name: &str) -> bool {
        self.keys.contains_key(key_name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Borrow the current mapping
    pub fn keys(&self) -> &ActiveKeys {
        &self.keys
    }

    /// Owned copy of the current mapping
    pub fn snapshot(&self) -> ActiveKeys {
        self.keys.clone()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Render a snapshot as `{KEY_A: 1, KEY_B: 3}`
pub fn format_active_keys(keys: &ActiveKeys) -> String {
    let body = keys
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}
