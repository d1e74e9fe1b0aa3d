//! MuMu emulator backend over the renderer IPC library
//!
//! This module provides:
//! - `api`: the capability boundary (`RendererApi`) for the native library
//! - `install`: install-path and library discovery
//! - `touch`: `MumuTouch`, the backend itself

mod api;
mod install;
mod touch;

pub use api::RendererApi;
pub use install::{
    resolve_install_path, resolve_library_path, DEFAULT_INSTALL_CANDIDATES,
    LEGACY_LIBRARY_RELPATH, NX_LIBRARY_RELPATH,
};
pub use touch::{MumuOptions, MumuTouch};
