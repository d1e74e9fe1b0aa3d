//! ADB (Android Debug Bridge) plumbing and the shell-input touch backend
//!
//! This module provides:
//! - `connection`: adb command execution, device listing, port forwarding
//! - `touch`: `AdbTouch`, the `adb shell input`-based backend

mod connection;
mod touch;

pub use connection::{list_devices, resolve_serial, ConnectionType, DeviceInfo};
pub use touch::AdbTouch;

pub(crate) use connection::{adb_prefix, forward, forward_remove};
