//! Device catalog: enumerate, filter to key-capable devices, search by name

use super::device::InputDeviceSource;
use super::search::SearchCriteria;
use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_TARGET: &str = "keystate::catalog";

/// Error type for device enumeration
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The device directory could not be listed at all
    #[error("cannot enumerate input devices in {}: {source}", dir.display())]
    Enumeration {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// OS-level device enumeration
pub trait DeviceEnumerator {
    type Device: InputDeviceSource;

    /// Paths of all candidate device nodes, in enumeration order
    fn device_paths(&self) -> Result<Vec<PathBuf>, CatalogError>;

    /// Open one device node
    fn open(&self, path: &Path) -> io::Result<Self::Device>;
}

/// Lists and searches input devices through a [`DeviceEnumerator`]
pub struct DeviceCatalog<E> {
    enumerator: E,
}

impl<E: DeviceEnumerator> DeviceCatalog<E> {
    pub fn new(enumerator: E) -> Self {
        Self { enumerator }
    }

    /// Open every enumerable device.
    ///
    /// Devices that cannot be opened (typically permission denied) are
    /// logged and skipped; only a failure to enumerate is an error.
    pub fn list_input_devices(&self) -> Result<Vec<E::Device>, CatalogError> {
        let paths = self.enumerator.device_paths()?;
        let mut devices = Vec::with_capacity(paths.len());

        for path in paths {
            match self.enumerator.open(&path) {
                Ok(device) => {
                    debug!(target: LOG_TARGET, "opened {} ({})", path.display(), device.name());
                    devices.push(device);
                }
                Err(e) => {
                    warn!(target: LOG_TARGET, "skipping {}: {}", path.display(), e);
                }
            }
        }

        debug!(target: LOG_TARGET, "{} input device(s) opened", devices.len());
        Ok(devices)
    }

    /// Devices advertising key-type events
    pub fn list_key_capable_devices(&self) -> Result<Vec<E::Device>, CatalogError> {
        let devices: Vec<E::Device> = self
            .list_input_devices()?
            .into_iter()
            .filter(|d| {
                let capable = d.capabilities().has_ev_key();
                if !capable {
                    debug!(target: LOG_TARGET, "no EV_KEY: {}", d.name());
                }
                capable
            })
            .collect();

        debug!(target: LOG_TARGET, "{} key-capable device(s)", devices.len());
        Ok(devices)
    }

    /// Key-capable devices whose name contains every keyword.
    ///
    /// An empty result is a normal outcome; callers decide how to report it.
    pub fn search_devices(&self, criteria: &SearchCriteria) -> Result<Vec<E::Device>, CatalogError> {
        debug!(target: LOG_TARGET, "search keywords={}", criteria);

        let devices = self.list_key_capable_devices()?;
        if criteria.is_empty() {
            return Ok(devices);
        }

        Ok(devices
            .into_iter()
            .filter(|d| criteria.matches(d.name()))
            .collect())
    }
}

/// Sort devices by node path for stable display
pub fn sort_by_path<D: InputDeviceSource>(devices: &mut [D]) {
    devices.sort_by(|a, b| a.path().cmp(b.path()));
}
