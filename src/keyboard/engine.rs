//! Key-state engine: the blocking read loop
//!
//! Decodes raw events from an [`InputDeviceSource`], folds them into the
//! [`ActiveKeySet`] and hands every recorded transition to a callback together
//! with the full set of held keys. The callback's return value is the only
//! way to stop the loop short of the device going away.

use super::device::InputDeviceSource;
use super::event::{decode_event, KeyState};
use super::state::{ActiveKeySet, ActiveKeys, Transition};
use log::{debug, error, warn};
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

const LOG_TARGET: &str = "keystate::engine";

/// Error a key callback may raise
pub type CallbackError = Box<dyn StdError + Send + Sync + 'static>;

/// `Ok(true)` keeps reading, `Ok(false)` stops the loop
pub type CallbackResult = Result<bool, CallbackError>;

/// Plain function pointer usable as a key callback
pub type KeyCallbackFn = fn(&str, KeyState, &ActiveKeys) -> CallbackResult;

/// Why a read loop ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The device stream ended
    EndOfStream,
    /// The callback asked to stop
    Stopped,
    /// No callback was supplied; nothing was read
    NoCallback,
}

/// Failures that end a read loop
#[derive(Debug, Error)]
pub enum EngineError {
    /// The device disappeared (unplugged or removed by the kernel)
    #[error("input device lost: {0}")]
    DeviceLost(#[source] io::Error),
    /// Any other read failure
    #[error("input device read failed: {0}")]
    Io(#[source] io::Error),
    /// The callback returned an error
    #[error("key callback failed: {0}")]
    Callback(#[source] CallbackError),
}

impl EngineError {
    fn from_read(e: io::Error) -> Self {
        if is_device_lost(&e) {
            EngineError::DeviceLost(e)
        } else {
            EngineError::Io(e)
        }
    }
}

#[cfg(target_os = "linux")]
fn is_device_lost(e: &io::Error) -> bool {
    e.raw_os_error() == Some(nix::libc::ENODEV) || e.kind() == io::ErrorKind::NotConnected
}

#[cfg(not(target_os = "linux"))]
fn is_device_lost(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotConnected
}

/// Drives read loops and owns the active key state between them
#[derive(Debug, Default)]
pub struct KeyStateEngine {
    active: ActiveKeySet,
    events_read: u64,
    callbacks: u64,
}

impl KeyStateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys held as of the last processed event
    pub fn active_keys(&self) -> &ActiveKeys {
        self.active.keys()
    }

    /// Raw events read during the last loop
    pub fn events_read(&self) -> u64 {
        self.events_read
    }

    /// Callback invocations during the last loop
    pub fn callbacks(&self) -> u64 {
        self.callbacks
    }

    /// Read `device` until the stream ends, the callback returns `false`, or
    /// a read or callback error occurs.
    ///
    /// The active set is cleared on entry. Non-key events are skipped,
    /// undecodable key events are logged and skipped, and a `Hold` for a key
    /// that is not held produces no callback. The device stays owned by the
    /// caller and is released when the caller drops it.
    pub fn run_read_loop<D, F>(
        &mut self,
        device: &mut D,
        on_key_event: Option<F>,
    ) -> Result<LoopExit, EngineError>
    where
        D: InputDeviceSource + ?Sized,
        F: FnMut(&str, KeyState, &ActiveKeys) -> CallbackResult,
    {
        debug!(target: LOG_TARGET, "read loop on {} ({})", device.path().display(), device.name());

        self.active.clear();
        self.events_read = 0;
        self.callbacks = 0;

        let Some(mut on_key_event) = on_key_event else {
            error!(target: LOG_TARGET, "no key callback given; read loop not started");
            return Ok(LoopExit::NoCallback);
        };

        loop {
            let raw = match device.next_event() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    debug!(target: LOG_TARGET, "end of stream: {}", device.path().display());
                    return Ok(LoopExit::EndOfStream);
                }
                Err(e) => return Err(EngineError::from_read(e)),
            };
            self.events_read += 1;

            let event = match decode_event(&raw) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    warn!(target: LOG_TARGET, "skipping key event: {}", e);
                    continue;
                }
            };

            if self.active.apply(&event) == Transition::Ignored {
                debug!(target: LOG_TARGET, "ignore {}:{} (not held)", event.key_name, event.key_state);
                continue;
            }
            debug!(
                target: LOG_TARGET,
                "{}:{} active={:?}",
                event.key_name,
                event.key_state,
                self.active.keys()
            );

            self.callbacks += 1;
            let keep_going = on_key_event(event.key_name, event.key_state, self.active.keys())
                .map_err(EngineError::Callback)?;
            if !keep_going {
                debug!(target: LOG_TARGET, "callback requested stop");
                return Ok(LoopExit::Stopped);
            }
        }
    }
}
