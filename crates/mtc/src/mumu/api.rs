//! Capability boundary for the MuMu external renderer IPC library
//!
//! The real binding to `external_renderer_ipc.dll` lives outside this crate;
//! the backend only depends on this trait. Calls return the library's raw
//! result codes so non-zero results stay first-class error conditions.

use std::path::Path;

/// Primitive operations of the renderer IPC library.
///
/// `connect` returns an integer handle (negative on failure); every other
/// call returns the library's result code, zero meaning success.
pub trait RendererApi: Send {
    fn connect(&mut self, install_path: &Path, instance_index: u32) -> i32;
    fn disconnect(&mut self, handle: i32) -> i32;
    /// Returns (result code, width, height)
    fn capture_display(&mut self, handle: i32, display_id: u32) -> (i32, u32, u32);
    fn touch_down(&mut self, handle: i32, display_id: u32, x: i32, y: i32) -> i32;
    fn touch_up(&mut self, handle: i32, display_id: u32) -> i32;
}
