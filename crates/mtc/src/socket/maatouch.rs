//! maatouch backend: minitouch-compatible framing with a true move command

use crate::adb::resolve_serial;
use crate::config::TIMING_CONFIG;
use crate::error::Result;
use crate::gesture::{plan_click, plan_swipe, Point, TimedEvent};
use crate::socket::encode_event;
use crate::socket::session::{SessionInfo, TouchSession};
use std::time::Duration;

const SOCKET_NAME: &str = "maatouch";
const DAEMON_CMD: &[&str] = &[
    "CLASSPATH=/data/local/tmp/maatouch",
    "app_process",
    "/",
    "com.shxyke.MaaTouch.App",
];
const PRESSURE: u32 = 50;

/// Touch control over a maatouch daemon session.
///
/// Same handshake and framing as minitouch, but movement uses the real `m`
/// command instead of repeated `d`.
pub struct MaaTouch {
    session: TouchSession,
    info: SessionInfo,
}

impl MaaTouch {
    /// Spawn the maatouch daemon on a device and attach to its socket.
    pub async fn connect(serial: Option<&str>) -> Result<Self> {
        let serial = resolve_serial(serial).await?;
        let session = TouchSession::open(&serial, SOCKET_NAME, DAEMON_CMD).await?;
        let info = session.info();
        Ok(Self { session, info })
    }

    /// Capability descriptor reported by the handshake
    pub fn session_info(&self) -> SessionInfo {
        self.info
    }

    /// Display dimensions as reported by the handshake
    pub fn display_size(&self) -> (u32, u32) {
        (self.info.max_x, self.info.max_y)
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
        self.replay(&plan_swipe(points, duration_ms, true)).await
    }

    /// Best-effort teardown: close the socket, kill the daemon, remove the
    /// forward. Safe to call more than once.
    pub async fn release(&mut self) {
        self.session.close().await;
    }

    async fn replay(&mut self, events: &[TimedEvent]) -> Result<()> {
        for timed in events {
            if timed.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(timed.delay_ms)).await;
            }
            for line in encode_event(timed.event, PRESSURE, true) {
                self.session.send(&line).await?;
            }
        }
        Ok(())
    }
}
