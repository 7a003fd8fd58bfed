//! Input devices, key decoding and key state tracking

pub mod catalog;
pub mod device;
pub mod engine;
pub mod event;
#[cfg(target_os = "linux")]
mod evdev_device;
pub mod keymap;
mod search;
mod state;

pub use catalog::{sort_by_path, CatalogError, DeviceCatalog, DeviceEnumerator};
pub use device::{DeviceCapabilities, DeviceInfo, InputDeviceSource};
pub use engine::{
    CallbackError, CallbackResult, EngineError, KeyCallbackFn, KeyStateEngine, LoopExit,
};
#[cfg(target_os = "linux")]
pub use evdev_device::{EvdevEnumerator, InputDevice, DEFAULT_INPUT_DIR};
pub use event::{decode_event, DecodeError, KeyEvent, KeyState, RawEvent};
pub use search::SearchCriteria;
pub use state::{format_active_keys, ActiveKeySet, ActiveKeys, Transition};
