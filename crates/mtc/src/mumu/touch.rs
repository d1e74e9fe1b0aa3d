//! Touch backend for the MuMu emulator's renderer IPC library

use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use crate::gesture::{plan_click, plan_swipe, Point, TimedEvent, TouchEvent};
use crate::mumu::api::RendererApi;
use crate::mumu::install::{
    resolve_install_path, resolve_library_path, DEFAULT_INSTALL_CANDIDATES,
};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Construction parameters for [`MumuTouch`]
#[derive(Debug, Clone, Default)]
pub struct MumuOptions {
    /// Emulator instance number
    pub instance_index: u32,
    /// Install directory; discovered when omitted
    pub install_path: Option<PathBuf>,
    /// Renderer library override; derived from the install path when omitted
    pub library_path: Option<PathBuf>,
    /// Logical sub-display, 0 for the main display
    pub display_id: u32,
}

impl MumuOptions {
    pub fn new(instance_index: u32) -> Self {
        Self {
            instance_index,
            ..Self::default()
        }
    }
}

/// Touch control over the MuMu renderer IPC library.
///
/// The library exposes no move primitive; swipe movement is approximated by
/// re-issuing touch-down at each intermediate point.
pub struct MumuTouch {
    api: Box<dyn RendererApi>,
    handle: Option<i32>,
    display_id: u32,
    install_path: PathBuf,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for MumuTouch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MumuTouch")
            .field("handle", &self.handle)
            .field("display_id", &self.display_id)
            .field("install_path", &self.install_path)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl MumuTouch {
    /// Resolve the install directory and renderer library, load the library
    /// through `load`, and connect to the instance.
    ///
    /// Path resolution failures and connect failures are fatal; no capability
    /// call is made before both paths resolve. The initial display query is
    /// soft and leaves dimensions at (0, 0) on failure.
    pub fn connect<L>(options: MumuOptions, load: L) -> Result<Self>
    where
        L: FnOnce(&Path) -> Result<Box<dyn RendererApi>>,
    {
        let registry = env::var("MTC_MUMU_PATH").ok().map(PathBuf::from);
        let install_path = resolve_install_path(
            options.install_path,
            registry,
            &DEFAULT_INSTALL_CANDIDATES,
        )?;
        let library_path = resolve_library_path(&install_path, options.library_path)?;

        let mut api = load(&library_path)?;
        let handle = api.connect(&install_path, options.instance_index);
        if handle < 0 {
            return Err(TouchError::Connection(format!(
                "renderer IPC connect failed for instance {} (handle {})",
                options.instance_index, handle
            )));
        }

        let mut touch = Self {
            api,
            handle: Some(handle),
            display_id: options.display_id,
            install_path,
            width: 0,
            height: 0,
        };
        touch.refresh_display_size();
        Ok(touch)
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Cached display dimensions, (0, 0) until a query succeeds
    pub fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Query the display size; a non-zero result code keeps the previous
    /// dimensions.
    pub fn refresh_display_size(&mut self) {
        let Some(handle) = self.handle else {
            warn!("display size query on released backend");
            return;
        };
        let (code, width, height) = self.api.capture_display(handle, self.display_id);
        if code != 0 {
            warn!(code, "failed to get the display size");
            return;
        }
        self.width = width;
        self.height = height;
    }

    /// Press at (x, y), holding for `duration_ms` (default 100ms)
    pub async fn click(&mut self, x: i32, y: i32, duration_ms: Option<u64>) -> Result<()> {
        let duration_ms = duration_ms.unwrap_or(TIMING_CONFIG.gesture.default_click_ms);
        self.replay(&plan_click(Point::new(x, y), duration_ms)).await
    }

    /// Swipe along `points`, spreading `duration_ms` (default 500ms) evenly
    /// across the path's segments
    pub async fn swipe(&mut self, points: &[Point], duration_ms: Option<u64>) -> Result<()> {
        let duration_ms = duration_ms.unwrap_or(TIMING_CONFIG.gesture.default_swipe_ms);
        self.replay(&plan_swipe(points, duration_ms, false)).await
    }

    /// Disconnect from the instance. Safe to call more than once; failures
    /// are logged, never raised.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            let code = self.api.disconnect(handle);
            if code != 0 {
                warn!(code, "renderer IPC disconnect failed");
            }
        }
    }

    async fn replay(&mut self, events: &[TimedEvent]) -> Result<()> {
        for timed in events {
            if timed.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(timed.delay_ms)).await;
            }
            let handle = self
                .handle
                .ok_or_else(|| TouchError::Transport("backend released".to_string()))?;
            let code = match timed.event {
                TouchEvent::Down(p) | TouchEvent::Move(p) => {
                    self.api.touch_down(handle, self.display_id, p.x, p.y)
                }
                TouchEvent::Up => self.api.touch_up(handle, self.display_id),
            };
            if code != 0 {
                return Err(TouchError::Transport(format!(
                    "touch event failed with code {}",
                    code
                )));
            }
        }
        Ok(())
    }
}

impl Drop for MumuTouch {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Connect(u32),
        Disconnect(i32),
        CaptureDisplay(u32),
        TouchDown(i32, i32, u64),
        TouchUp(u64),
    }

    /// Records every capability call with the virtual-time offset at which
    /// it was made.
    struct MockApi {
        calls: Arc<Mutex<Vec<Call>>>,
        started: tokio::time::Instant,
        capture_code: i32,
        down_code: i32,
    }

    impl MockApi {
        fn new(calls: Arc<Mutex<Vec<Call>>>) -> Self {
            Self {
                calls,
                started: tokio::time::Instant::now(),
                capture_code: 0,
                down_code: 0,
            }
        }

        fn elapsed_ms(&self) -> u64 {
            self.started.elapsed().as_millis() as u64
        }
    }

    impl RendererApi for MockApi {
        fn connect(&mut self, _install_path: &Path, instance_index: u32) -> i32 {
            self.calls.lock().unwrap().push(Call::Connect(instance_index));
            7
        }

        fn disconnect(&mut self, handle: i32) -> i32 {
            self.calls.lock().unwrap().push(Call::Disconnect(handle));
            0
        }

        fn capture_display(&mut self, _handle: i32, display_id: u32) -> (i32, u32, u32) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::CaptureDisplay(display_id));
            (self.capture_code, 1920, 1080)
        }

        fn touch_down(&mut self, _handle: i32, _display_id: u32, x: i32, y: i32) -> i32 {
            let at = self.elapsed_ms();
            self.calls.lock().unwrap().push(Call::TouchDown(x, y, at));
            self.down_code
        }

        fn touch_up(&mut self, _handle: i32, _display_id: u32) -> i32 {
            let at = self.elapsed_ms();
            self.calls.lock().unwrap().push(Call::TouchUp(at));
            0
        }
    }

    fn fake_install() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("uninstall.exe"), b"").unwrap();
        let lib = dir.path().join(crate::mumu::install::LEGACY_LIBRARY_RELPATH);
        fs::create_dir_all(lib.parent().unwrap()).unwrap();
        fs::write(&lib, b"").unwrap();
        dir
    }

    fn connect_mock(
        dir: &TempDir,
        configure: impl FnOnce(&mut MockApi),
    ) -> (MumuTouch, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let options = MumuOptions {
            instance_index: 3,
            install_path: Some(dir.path().to_path_buf()),
            ..MumuOptions::default()
        };
        let touch = MumuTouch::connect(options, move |_library| {
            let mut api = MockApi::new(recorded);
            configure(&mut api);
            Ok(Box::new(api))
        })
        .unwrap();
        (touch, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn connect_queries_display_once() {
        let dir = fake_install();
        let (touch, calls) = connect_mock(&dir, |_| {});
        assert_eq!(touch.display_size(), (1920, 1080));
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Connect(3), Call::CaptureDisplay(0)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_display_query_keeps_previous_size() {
        let dir = fake_install();
        let (mut touch, _calls) = connect_mock(&dir, |api| api.capture_code = -1);
        assert_eq!(touch.display_size(), (0, 0));
        touch.refresh_display_size();
        assert_eq!(touch.display_size(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn click_is_down_wait_up() {
        let dir = fake_install();
        let (mut touch, calls) = connect_mock(&dir, |_| {});
        touch.click(100, 100, Some(100)).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[2..],
            [Call::TouchDown(100, 100, 0), Call::TouchUp(100)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn swipe_substitutes_down_for_move_with_even_timing() {
        let dir = fake_install();
        let (mut touch, calls) = connect_mock(&dir, |_| {});
        let points = [
            Point::new(100, 100),
            Point::new(200, 200),
            Point::new(300, 300),
        ];
        touch.swipe(&points, Some(500)).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[2..],
            [
                Call::TouchDown(100, 100, 0),
                Call::TouchDown(200, 200, 250),
                Call::TouchDown(300, 300, 500),
                Call::TouchUp(500),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_swipe_makes_no_capability_calls() {
        let dir = fake_install();
        let (mut touch, calls) = connect_mock(&dir, |_| {});
        let before = calls.lock().unwrap().len();
        touch.swipe(&[], Some(500)).await.unwrap();
        assert_eq!(calls.lock().unwrap().len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_propagates_and_stops_the_gesture() {
        let dir = fake_install();
        let (mut touch, calls) = connect_mock(&dir, |api| api.down_code = 5);
        let err = touch.click(10, 10, Some(50)).await.unwrap_err();
        assert!(matches!(err, TouchError::Transport(_)));
        // no touch-up after the failed down
        assert!(!calls.lock().unwrap().iter().any(|c| matches!(c, Call::TouchUp(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn release_is_idempotent() {
        let dir = fake_install();
        let (mut touch, calls) = connect_mock(&dir, |_| {});
        touch.release();
        touch.release();
        drop(touch);

        let disconnects = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Disconnect(_)))
            .count();
        assert_eq!(disconnects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_marker_fails_before_any_capability_call() {
        let dir = TempDir::new().unwrap();
        let options = MumuOptions {
            instance_index: 0,
            install_path: Some(dir.path().to_path_buf()),
            ..MumuOptions::default()
        };
        let loaded = Arc::new(Mutex::new(false));
        let flag = loaded.clone();
        let err = MumuTouch::connect(options, move |_library| {
            *flag.lock().unwrap() = true;
            Ok(Box::new(MockApi::new(Arc::new(Mutex::new(Vec::new()))))
                as Box<dyn RendererApi>)
        })
        .unwrap_err();

        assert!(matches!(err, TouchError::Config(_)));
        assert!(!*loaded.lock().unwrap());
    }
}
