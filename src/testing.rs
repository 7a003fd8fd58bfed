//! Scripted devices and event constructors for tests
//!
//! Lets the catalog and the read loop run without touching `/dev/input`.

use crate::keyboard::catalog::{CatalogError, DeviceEnumerator};
use crate::keyboard::device::{DeviceCapabilities, InputDeviceSource};
use crate::keyboard::event::{RawEvent, EV_KEY, EV_MSC, EV_REL, EV_SYN};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

/// Creates a raw event of any type.
pub fn raw(event_type: u16, code: u16, value: i32) -> RawEvent {
    RawEvent::new(event_type, code, value)
}

/// Key press (value 1)
pub fn key_down(code: u16) -> RawEvent {
    raw(EV_KEY, code, 1)
}

/// Auto-repeat (value 2)
pub fn key_hold(code: u16) -> RawEvent {
    raw(EV_KEY, code, 2)
}

/// Key release (value 0)
pub fn key_up(code: u16) -> RawEvent {
    raw(EV_KEY, code, 0)
}

/// `SYN_REPORT` separator
pub fn syn_report() -> RawEvent {
    raw(EV_SYN, 0, 0)
}

/// Press followed by release, each with its sync report, the way a keyboard
/// driver emits them.
pub fn tap(code: u16) -> Vec<RawEvent> {
    vec![
        raw(EV_MSC, 4, 458_752 + code as i32),
        key_down(code),
        syn_report(),
        key_up(code),
        syn_report(),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Event(RawEvent),
    Fail(io::ErrorKind),
}

/// An input device that replays a fixed script
#[derive(Debug, Clone)]
pub struct ScriptedDevice {
    path: PathBuf,
    name: String,
    phys: Option<String>,
    capabilities: DeviceCapabilities,
    script: VecDeque<Step>,
}

impl ScriptedDevice {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, capabilities: DeviceCapabilities) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            phys: None,
            capabilities,
            script: VecDeque::new(),
        }
    }

    /// A device advertising key events
    pub fn keyboard(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(path, name, DeviceCapabilities::new([EV_SYN, EV_KEY, EV_MSC]))
    }

    /// A pure pointer device without key events
    pub fn mouse(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(path, name, DeviceCapabilities::new([EV_SYN, EV_REL]))
    }

    pub fn with_phys(mut self, phys: impl Into<String>) -> Self {
        self.phys = Some(phys.into());
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = RawEvent>) -> Self {
        self.script.extend(events.into_iter().map(Step::Event));
        self
    }

    /// Fail the read at this point of the script
    pub fn with_failure(mut self, kind: io::ErrorKind) -> Self {
        self.script.push_back(Step::Fail(kind));
        self
    }

    /// Script steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputDeviceSource for ScriptedDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn phys(&self) -> Option<&str> {
        self.phys.as_deref()
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn next_event(&mut self) -> io::Result<Option<RawEvent>> {
        match self.script.pop_front() {
            Some(Step::Event(ev)) => Ok(Some(ev)),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => Ok(None),
        }
    }
}

/// Enumerator over a fixed list of scripted devices
#[derive(Debug, Clone, Default)]
pub struct ScriptedEnumerator {
    entries: Vec<(PathBuf, Option<ScriptedDevice>)>,
    unavailable: Option<PathBuf>,
}

impl ScriptedEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An enumerator whose device directory cannot be read
    pub fn unavailable(dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            unavailable: Some(dir.into()),
        }
    }

    pub fn with_device(mut self, device: ScriptedDevice) -> Self {
        self.entries.push((device.path.clone(), Some(device)));
        self
    }

    /// A node that is listed but fails to open with permission denied
    pub fn with_unopenable(mut self, path: impl Into<PathBuf>) -> Self {
        self.entries.push((path.into(), None));
        self
    }
}

impl DeviceEnumerator for ScriptedEnumerator {
    type Device = ScriptedDevice;

    fn device_paths(&self) -> Result<Vec<PathBuf>, CatalogError> {
        if let Some(dir) = &self.unavailable {
            return Err(CatalogError::Enumeration {
                dir: dir.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            });
        }
        Ok(self.entries.iter().map(|(path, _)| path.clone()).collect())
    }

    fn open(&self, path: &Path) -> io::Result<ScriptedDevice> {
        match self.entries.iter().find(|(p, _)| p == path) {
            Some((_, Some(device))) => Ok(device.clone()),
            Some((_, None)) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such device")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_device_replays_then_ends() {
        let mut dev = ScriptedDevice::keyboard("/dev/input/event0", "kbd").with_events(tap(30));
        assert_eq!(dev.remaining(), 5);
        let mut count = 0;
        while dev.next_event().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 5);
        assert!(dev.next_event().unwrap().is_none());
    }

    #[test]
    fn scripted_failure_surfaces_as_io_error() {
        let mut dev = ScriptedDevice::mouse("/dev/input/event1", "mouse")
            .with_failure(io::ErrorKind::PermissionDenied);
        let err = dev.next_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn unopenable_nodes_fail_to_open() {
        let e = ScriptedEnumerator::new().with_unopenable("/dev/input/event5");
        assert_eq!(e.device_paths().unwrap().len(), 1);
        let err = e.open(Path::new("/dev/input/event5")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
