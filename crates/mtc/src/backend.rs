//! Closed set of touch backend variants behind one gesture contract

use crate::adb::AdbTouch;
use crate::error::Result;
use crate::gesture::Point;
use crate::mumu::MumuTouch;
use crate::socket::{MaaTouch, MiniTouch};
use std::fmt;
use std::str::FromStr;

/// Kind of touch backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Adb,
    MiniTouch,
    MaaTouch,
    Mumu,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Adb => "adb",
            BackendKind::MiniTouch => "minitouch",
            BackendKind::MaaTouch => "maatouch",
            BackendKind::Mumu => "mumu",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "adb" => Ok(BackendKind::Adb),
            "minitouch" => Ok(BackendKind::MiniTouch),
            "maatouch" => Ok(BackendKind::MaaTouch),
            "mumu" => Ok(BackendKind::Mumu),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// One constructed touch backend.
///
/// Every variant exposes the same `click`/`swipe` semantics; only the
/// transport underneath differs. Gesture methods take `&mut self`, so one
/// gesture is in flight per backend at a time.
pub enum TouchBackend {
    Adb(AdbTouch),
    MiniTouch(MiniTouch),
    MaaTouch(MaaTouch),
    Mumu(MumuTouch),
}

impl TouchBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            TouchBackend::Adb(_) => BackendKind::Adb,
            TouchBackend::MiniTouch(_) => BackendKind::MiniTouch,
            TouchBackend::MaaTouch(_) => BackendKind::MaaTouch,
            TouchBackend::Mumu(_) => BackendKind::Mumu,
        }
    }

    /// Cached display dimensions, (0, 0) until a query succeeds
    pub fn display_size(&self) -> (u32, u32) {
        match self {
            TouchBackend::Adb(t) => t.display_size(),
            TouchBackend::MiniTouch(t) => t.display_size(),
            TouchBackend::MaaTouch(t) => t.display_size(),
            TouchBackend::Mumu(t) => t.display_size(),
        }
    }

    /// Re-query the display size where the backend supports it. Soft: never
    /// fails, keeps previous dimensions on error. Socket backends report
    /// fixed handshake values.
    pub async fn refresh_display_size(&mut self) {
        match self {
            TouchBackend::Adb(t) => t.refresh_display_size().await,
            TouchBackend::MiniTouch(_) | TouchBackend::MaaTouch(_) => {}
            TouchBackend::Mumu(t) => t.refresh_display_size(),
        }
    }

    /// Press at (x, y), holding for `duration_ms` (default 100ms)
    pub async fn click(&mut self, x: i32, y: i32, duration_ms: Option<u64>) -> Result<()> {
        match self {
            TouchBackend::Adb(t) => t.click(x, y, duration_ms).await,
            TouchBackend::MiniTouch(t) => t.click(x, y, duration_ms).await,
            TouchBackend::MaaTouch(t) => t.click(x, y, duration_ms).await,
            TouchBackend::Mumu(t) => t.click(x, y, duration_ms).await,
        }
    }

    /// Swipe along `points`, spreading `duration_ms` (default 500ms) evenly
    /// across the path's segments. Empty paths are a no-op.
    pub async fn swipe(&mut self, points: &[Point], duration_ms: Option<u64>) -> Result<()> {
        match self {
            TouchBackend::Adb(t) => t.swipe(points, duration_ms).await,
            TouchBackend::MiniTouch(t) => t.swipe(points, duration_ms).await,
            TouchBackend::MaaTouch(t) => t.swipe(points, duration_ms).await,
            TouchBackend::Mumu(t) => t.swipe(points, duration_ms).await,
        }
    }

    /// Best-effort teardown. Safe to call more than once; transport errors
    /// are logged, never raised.
    pub async fn release(&mut self) {
        match self {
            TouchBackend::Adb(t) => t.release().await,
            TouchBackend::MiniTouch(t) => t.release().await,
            TouchBackend::MaaTouch(t) => t.release().await,
            TouchBackend::Mumu(t) => t.release(),
        }
    }
}

impl From<AdbTouch> for TouchBackend {
    fn from(touch: AdbTouch) -> Self {
        TouchBackend::Adb(touch)
    }
}

impl From<MiniTouch> for TouchBackend {
    fn from(touch: MiniTouch) -> Self {
        TouchBackend::MiniTouch(touch)
    }
}

impl From<MaaTouch> for TouchBackend {
    fn from(touch: MaaTouch) -> Self {
        TouchBackend::MaaTouch(touch)
    }
}

impl From<MumuTouch> for TouchBackend {
    fn from(touch: MumuTouch) -> Self {
        TouchBackend::Mumu(touch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_round_trips_through_strings() {
        for kind in [
            BackendKind::Adb,
            BackendKind::MiniTouch,
            BackendKind::MaaTouch,
            BackendKind::Mumu,
        ] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_backend_kind_is_rejected() {
        assert!("scrcpy".parse::<BackendKind>().is_err());
    }

    #[test]
    fn backend_kind_default_is_adb() {
        assert_eq!(BackendKind::default(), BackendKind::Adb);
    }
}
