//! Raw input events and the key-event decode

use super::keymap;
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;

/// Event type numbers from `linux/input-event-codes.h`
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;

/// Human-readable name of an event type number.
pub fn event_type_name(event_type: u16) -> &'static str {
    match event_type {
        EV_SYN => "EV_SYN",
        EV_KEY => "EV_KEY",
        EV_REL => "EV_REL",
        EV_ABS => "EV_ABS",
        EV_MSC => "EV_MSC",
        0x05 => "EV_SW",
        0x11 => "EV_LED",
        0x12 => "EV_SND",
        0x14 => "EV_REP",
        0x15 => "EV_FF",
        0x16 => "EV_PWR",
        0x17 => "EV_FF_STATUS",
        _ => "EV_UNKNOWN",
    }
}

/// A timestamped type/code/value event as delivered by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
    pub timestamp: SystemTime,
}

impl RawEvent {
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
            timestamp: SystemTime::now(),
        }
    }

    pub fn is_key(&self) -> bool {
        self.event_type == EV_KEY
    }
}

#[cfg(target_os = "linux")]
impl From<evdev::InputEvent> for RawEvent {
    fn from(ev: evdev::InputEvent) -> Self {
        Self {
            event_type: ev.event_type().0,
            code: ev.code(),
            value: ev.value(),
            timestamp: ev.timestamp(),
        }
    }
}

/// State carried by an `EV_KEY` event value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key released (value 0)
    Up,
    /// Key pressed (value 1)
    Down,
    /// Auto-repeat while held (value 2)
    Hold,
}

impl KeyState {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Up),
            1 => Some(KeyState::Down),
            2 => Some(KeyState::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyState::Up => "up",
            KeyState::Down => "down",
            KeyState::Hold => "hold",
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded key transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_name: &'static str,
    pub key_state: KeyState,
}

impl KeyEvent {
    pub fn new(key_name: &'static str, key_state: KeyState) -> Self {
        Self {
            key_name,
            key_state,
        }
    }
}

/// A key-type event that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown key code {0}")]
    UnknownKeyCode(u16),
    #[error("invalid value {value} for key code {code}")]
    InvalidKeyValue { code: u16, value: i32 },
}

/// Decode a raw event into a key transition.
///
/// Returns `Ok(None)` for events that are not key-type events; those are
/// skipped by the read loop without any diagnostic. When a code has several
/// aliases the canonical (first) one is used.
pub fn decode_event(raw: &RawEvent) -> Result<Option<KeyEvent>, DecodeError> {
    if !raw.is_key() {
        return Ok(None);
    }

    let key_name = keymap::key_name(raw.code).ok_or(DecodeError::UnknownKeyCode(raw.code))?;
    let key_state = KeyState::from_value(raw.value).ok_or(DecodeError::InvalidKeyValue {
        code: raw.code,
        value: raw.value,
    })?;

    Ok(Some(KeyEvent::new(key_name, key_state)))
}
