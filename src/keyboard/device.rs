//! Input device abstraction
//! Capability analysis and the narrow interface the read loop drives

use super::event::{event_type_name, RawEvent, EV_KEY};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::Path;

/// Device capabilities extracted from the kernel's capability bitsets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Supported event type numbers (`EV_KEY`, `EV_REL`, ...)
    pub event_types: BTreeSet<u16>,
}

impl DeviceCapabilities {
    pub fn new(event_types: impl IntoIterator<Item = u16>) -> Self {
        Self {
            event_types: event_types.into_iter().collect(),
        }
    }

    /// Whether the device advertises key-type events
    pub fn has_ev_key(&self) -> bool {
        self.event_types.contains(&EV_KEY)
    }

    /// Event type names, e.g. `["EV_KEY", "EV_SYN"]`
    pub fn event_type_names(&self) -> Vec<&'static str> {
        self.event_types.iter().map(|t| event_type_name(*t)).collect()
    }
}

/// What the read loop and the catalog need from an input device.
///
/// The concrete evdev binding implements this; tests substitute scripted
/// devices.
pub trait InputDeviceSource {
    /// Display name reported by the driver
    fn name(&self) -> &str;

    /// Device node path, e.g. `/dev/input/event3`
    fn path(&self) -> &Path;

    /// Physical topology string, when the driver reports one
    fn phys(&self) -> Option<&str> {
        None
    }

    fn capabilities(&self) -> &DeviceCapabilities;

    /// Block until the next raw event arrives.
    ///
    /// `Ok(None)` means the stream has ended cleanly.
    fn next_event(&mut self) -> io::Result<Option<RawEvent>>;
}

impl<T: InputDeviceSource + ?Sized> InputDeviceSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn path(&self) -> &Path {
        (**self).path()
    }

    fn phys(&self) -> Option<&str> {
        (**self).phys()
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        (**self).capabilities()
    }

    fn next_event(&mut self) -> io::Result<Option<RawEvent>> {
        (**self).next_event()
    }
}

/// Display/serialization record for a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub phys: Option<String>,
    pub event_types: Vec<&'static str>,
}

impl DeviceInfo {
    pub fn from_source<D: InputDeviceSource + ?Sized>(device: &D) -> Self {
        Self {
            path: device.path().display().to_string(),
            name: device.name().to_string(),
            phys: device.phys().map(str::to_string),
            event_types: device.capabilities().event_type_names(),
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device {}, name \"{}\", phys \"{}\"",
            self.path,
            self.name,
            self.phys.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::event::{EV_REL, EV_SYN};
    use crate::testing::ScriptedDevice;

    #[test]
    fn capabilities_detect_ev_key() {
        let kbd = DeviceCapabilities::new([EV_SYN, EV_KEY]);
        assert!(kbd.has_ev_key());

        let mouse = DeviceCapabilities::new([EV_SYN, EV_REL]);
        assert!(!mouse.has_ev_key());
    }

    #[test]
    fn capability_names_are_ordered() {
        let caps = DeviceCapabilities::new([EV_REL, EV_KEY, EV_SYN]);
        assert_eq!(caps.event_type_names(), vec!["EV_SYN", "EV_KEY", "EV_REL"]);
    }

    #[test]
    fn device_info_display() {
        let dev = ScriptedDevice::keyboard("/dev/input/event3", "AT Translated Set 2 keyboard")
            .with_phys("isa0060/serio0/input0");
        let info = DeviceInfo::from_source(&dev);
        assert_eq!(
            info.to_string(),
            "device /dev/input/event3, name \"AT Translated Set 2 keyboard\", phys \"isa0060/serio0/input0\""
        );
    }

    #[test]
    fn device_info_serializes() {
        let dev = ScriptedDevice::keyboard("/dev/input/event7", "Foo Bar Keyboard");
        let json = serde_json::to_string(&DeviceInfo::from_source(&dev)).unwrap();
        assert!(json.contains("\"path\":\"/dev/input/event7\""));
        assert!(json.contains("\"phys\":null"));
        assert!(json.contains("\"EV_KEY\""));
    }
}
