//! evdev-backed input devices for Linux
//!
//! Enumerates `/dev/input/event*` nodes and wraps each opened node as an
//! [`InputDeviceSource`] whose reads block until the kernel delivers events.

use super::catalog::{CatalogError, DeviceEnumerator};
use super::device::{DeviceCapabilities, InputDeviceSource};
use super::event::RawEvent;
use log::debug;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "keystate::catalog";

/// Default location of evdev device nodes
pub const DEFAULT_INPUT_DIR: &str = "/dev/input";

/// An opened evdev device node
pub struct InputDevice {
    path: PathBuf,
    name: String,
    phys: Option<String>,
    capabilities: DeviceCapabilities,
    device: evdev::Device,
    pending: VecDeque<RawEvent>,
}

impl InputDevice {
    /// Open a device node in blocking mode
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = evdev::Device::open(&path)?;
        set_blocking(&device)?;

        let capabilities = DeviceCapabilities::new(device.supported_events().iter().map(|t| t.0));

        Ok(Self {
            name: device.name().unwrap_or("").to_string(),
            phys: device.physical_path().map(str::to_string),
            path,
            capabilities,
            device,
            pending: VecDeque::new(),
        })
    }
}

impl InputDeviceSource for InputDevice {
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
        let device = &mut self.device;
        refill(&mut self.pending, |queue| {
            // Blocks until the kernel has at least one event for us
            queue.extend(device.fetch_events()?.map(RawEvent::from));
            Ok(())
        })?;
        Ok(self.pending.pop_front())
    }
}

/// Fetch batches into an empty `pending` queue until one yields events.
///
/// evdev only hands out complete `SYN_REPORT` blocks, so a batch can be empty
/// after `SYN_DROPPED` or a partial frame while the device is still there. A
/// removed device fails the read with `ENODEV` instead.
fn refill<F>(pending: &mut VecDeque<RawEvent>, mut fetch: F) -> io::Result<()>
where
    F: FnMut(&mut VecDeque<RawEvent>) -> io::Result<()>,
{
    while pending.is_empty() {
        fetch(pending)?;
        if pending.is_empty() {
            debug!(target: LOG_TARGET, "empty event batch, reading again");
        }
    }
    Ok(())
}

/// Clear `O_NONBLOCK` so reads wait for the next event
fn set_blocking(device: &evdev::Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    if flags.contains(OFlag::O_NONBLOCK) {
        let mut flags = flags;
        flags.remove(OFlag::O_NONBLOCK);
        fcntl(fd, FcntlArg::F_SETFL(flags))?;
    }
    Ok(())
}

/// Enumerates `event*` character devices in an input directory
#[derive(Debug, Clone)]
pub struct EvdevEnumerator {
    input_dir: PathBuf,
}

impl EvdevEnumerator {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }
}

impl Default for EvdevEnumerator {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR)
    }
}

impl DeviceEnumerator for EvdevEnumerator {
    type Device = InputDevice;

    fn device_paths(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let entries = fs::read_dir(&self.input_dir).map_err(|source| CatalogError::Enumeration {
            dir: self.input_dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_event_node = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("event"));
            if !is_event_node {
                continue;
            }

            match entry.file_type() {
                Ok(ft) if ft.is_char_device() => paths.push(path),
                Ok(_) => debug!(target: LOG_TARGET, "not a character device: {}", path.display()),
                Err(e) => debug!(target: LOG_TARGET, "cannot stat {}: {}", path.display(), e),
            }
        }

        Ok(paths)
    }

    fn open(&self, path: &Path) -> io::Result<InputDevice> {
        InputDevice::open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::catalog::DeviceCatalog;
    use crate::testing::{key_down, key_up, syn_report};

    #[test]
    fn test_enumerate_devices() {
        // Device access depends on the machine; just make sure nothing panics
        let catalog = DeviceCatalog::new(EvdevEnumerator::default());
        match catalog.list_key_capable_devices() {
            Ok(devices) => println!("Found {} key-capable devices", devices.len()),
            Err(e) => println!("Expected error in test environment: {}", e),
        }
    }

    #[test]
    fn empty_batches_are_read_past() {
        // Two dropped blocks, then a key press
        let mut batches = vec![vec![], vec![], vec![key_down(30), syn_report()]].into_iter();
        let mut fetches = 0;
        let mut pending = VecDeque::new();

        refill(&mut pending, |queue| {
            fetches += 1;
            queue.extend(batches.next().unwrap_or_default());
            Ok(())
        })
        .unwrap();

        assert_eq!(fetches, 3);
        assert_eq!(pending.len(), 2);
        assert!(pending[0].is_key());
    }

    #[test]
    fn refill_keeps_buffered_events_and_surfaces_errors() {
        let mut pending = VecDeque::from([key_up(30)]);
        refill(&mut pending, |_| panic!("buffered events must be used first")).unwrap();
        assert_eq!(pending.len(), 1);

        let mut pending = VecDeque::new();
        let err = refill(&mut pending, |_| {
            Err(io::Error::from_raw_os_error(nix::libc::ENODEV))
        })
        .unwrap_err();
        assert_eq!(err.raw_os_error(), Some(nix::libc::ENODEV));
    }

    #[test]
    fn missing_directory_is_an_enumeration_error() {
        let enumerator = EvdevEnumerator::new("/nonexistent/input");
        let err = enumerator.device_paths().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/input"));
    }

    #[test]
    fn regular_files_are_not_devices() {
        let dir = std::env::temp_dir().join(format!("keystate-input-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("event0"), b"").unwrap();

        let paths = EvdevEnumerator::new(&dir).device_paths().unwrap();
        assert!(paths.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
