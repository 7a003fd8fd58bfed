//! Interactive key monitor built on the read loop
//!
//! Picks exactly one device for a search and prints key transitions until the
//! configured exit key is held long enough.

use crate::config::MonitorConfig;
use crate::keyboard::{
    format_active_keys, keymap, ActiveKeys, CallbackResult, InputDeviceSource, KeyState,
    SearchCriteria,
};
use log::debug;
use std::io::Write;
use thiserror::Error;

const LOG_TARGET: &str = "keystate::monitor";

/// Outcome of resolving a search to a single device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no such device: {0}")]
    NoMatch(SearchCriteria),
    #[error("ambiguous: {0:?}")]
    Ambiguous(Vec<String>),
}

/// Take the only device of a search result.
///
/// Zero or several matches are reported to the user rather than guessed at.
pub fn select_single_device<D: InputDeviceSource>(
    mut devices: Vec<D>,
    criteria: &SearchCriteria,
) -> Result<D, SelectError> {
    match devices.len() {
        0 => Err(SelectError::NoMatch(criteria.clone())),
        1 => Ok(devices.remove(0)),
        _ => Err(SelectError::Ambiguous(
            devices.iter().map(|d| d.name().to_string()).collect(),
        )),
    }
}

/// Read-loop callback that prints changes of the held-key set
pub struct KeyMonitor<W> {
    out: W,
    show_repeat: bool,
    exit_key: String,
    exit_hold_count: u32,
    prev: ActiveKeys,
}

impl<W: Write> KeyMonitor<W> {
    pub fn new(out: W, config: &MonitorConfig) -> Self {
        let exit_key = keymap::canonical_name(&config.exit_key)
            .map(str::to_string)
            .unwrap_or_else(|| config.exit_key.clone());
        Self {
            out,
            show_repeat: config.show_repeat,
            exit_key,
            exit_hold_count: config.exit_hold_count,
            prev: ActiveKeys::new(),
        }
    }

    pub fn with_repeat(mut self, show_repeat: bool) -> Self {
        self.show_repeat = show_repeat;
        self
    }

    pub fn exit_key(&self) -> &str {
        &self.exit_key
    }

    /// Hint printed before the loop starts
    pub fn exit_hint(&self) -> String {
        let label = self.exit_key.strip_prefix("KEY_").unwrap_or(&self.exit_key);
        format!("* long press '{label}' to exit.")
    }

    /// Handle one transition; `Ok(false)` ends the read loop.
    ///
    /// A snapshot equal to the previous one is swallowed. Repeats are printed
    /// only when enabled, but still count toward the exit key.
    pub fn on_key_event(
        &mut self,
        key_name: &str,
        key_state: KeyState,
        active: &ActiveKeys,
    ) -> CallbackResult {
        if *active == self.prev {
            return Ok(true);
        }
        debug!(
            target: LOG_TARGET,
            "{} -> {}",
            format_active_keys(&self.prev),
            format_active_keys(active)
        );
        self.prev = active.clone();

        if active
            .get(&self.exit_key)
            .is_some_and(|count| *count > self.exit_hold_count)
        {
            writeln!(self.out, "Bye !")?;
            return Ok(false);
        }

        if key_state == KeyState::Hold && !self.show_repeat {
            return Ok(true);
        }

        writeln!(self.out, "{}:{}  {}", key_name, key_state, format_active_keys(active))?;
        Ok(true)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
