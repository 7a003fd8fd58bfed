//! Keystate Tracker - follow the keys held on a Linux input device
//!
//! Finds key-capable input devices by name, runs a blocking read loop against
//! one of them and reports every change of the held-key set to a callback.

pub mod config;
pub mod keyboard;
pub mod monitor;
pub mod testing;

pub use config::Config;
pub use keyboard::{
    ActiveKeys, DeviceCatalog, KeyState, KeyStateEngine, LoopExit, SearchCriteria,
};
