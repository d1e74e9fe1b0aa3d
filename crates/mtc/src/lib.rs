//! mtc: mobile touch control
//!
//! A uniform `click`/`swipe` abstraction over Android devices and emulators,
//! with one backend per transport:
//! - ADB shell input injection (`AdbTouch`)
//! - minitouch forwarded-socket protocol (`MiniTouch`)
//! - maatouch forwarded-socket protocol with true move support (`MaaTouch`)
//! - MuMu emulator renderer IPC (`MumuTouch`)
//!
//! All backends share the same gesture timing: a click is down, hold, up; a
//! swipe spreads its duration evenly across the path's segments. Backends
//! without a move primitive approximate movement by re-issuing touch-down.
//!
//! # Example
//!
//! ```no_run
//! use mtc::{AdbTouch, Point};
//!
//! #[tokio::main]
//! async fn main() -> mtc::Result<()> {
//!     let mut touch = AdbTouch::connect(None).await?;
//!     touch.click(100, 100, None).await?;
//!     touch
//!         .swipe(&[Point::new(100, 100), Point::new(300, 300)], Some(500))
//!         .await?;
//!     touch.release().await;
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration
pub mod config;

// Gesture translation
pub mod gesture;

// Transport backends
pub mod adb;
pub mod mumu;
pub mod socket;

// Backend variant dispatch
pub mod backend;

// Re-export commonly used types and functions
pub use error::{Result, TouchError};

// Config re-exports
pub use config::{GestureTimingConfig, TimingConfig, TransportConfig, TIMING_CONFIG};

// Gesture re-exports
pub use gesture::{plan_click, plan_swipe, Point, TimedEvent, TouchEvent};

// ADB re-exports
pub use adb::{list_devices, resolve_serial, AdbTouch, ConnectionType, DeviceInfo};

// Socket backend re-exports
pub use socket::{MaaTouch, MiniTouch, SessionInfo};

// MuMu re-exports
pub use mumu::{MumuOptions, MumuTouch, RendererApi};

// Backend dispatch re-exports
pub use backend::{BackendKind, TouchBackend};
