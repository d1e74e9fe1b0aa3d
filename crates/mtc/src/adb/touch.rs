//! Touch backend driven by `adb shell input` commands

use crate::adb::connection::{resolve_serial, shell};
use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use crate::gesture::Point;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    // "Physical size: 1080x1920", optionally followed by an override line
    static ref WM_SIZE_RE: Regex = Regex::new(r"(\d+)x(\d+)").unwrap();
}

/// Touch control over plain `adb shell input`.
///
/// The shell has no separate down/move/up primitives, so gestures delegate
/// to the device's own `input swipe`: a click is a same-point swipe held for
/// the requested duration, and a multi-point path runs one swipe command per
/// segment. No handle outlives each command; only the serial is kept.
pub struct AdbTouch {
    serial: String,
    width: u32,
    height: u32,
}

impl AdbTouch {
    /// Connect to a device by serial, or to the first ready device.
    pub async fn connect(serial: Option<&str>) -> Result<Self> {
        let serial = resolve_serial(serial).await?;
        let mut touch = Self {
            serial,
            width: 0,
            height: 0,
        };
        touch.refresh_display_size().await;
        Ok(touch)
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Cached display dimensions, (0, 0) until a query succeeds
    pub fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Query `wm size`; on failure keeps the previous dimensions.
    pub async fn refresh_display_size(&mut self) {
        match shell(&self.serial, &["wm", "size"]).await {
            Ok(output) => match parse_wm_size(&output) {
                Some((width, height)) => {
                    self.width = width;
                    self.height = height;
                }
                None => warn!(serial = %self.serial, "could not parse wm size output"),
            },
            Err(err) => warn!(serial = %self.serial, %err, "display size query failed"),
        }
    }

    /// Press at (x, y), holding for `duration_ms` (default 100ms)
    pub async fn click(&mut self, x: i32, y: i32, duration_ms: Option<u64>) -> Result<()> {
        let duration_ms = duration_ms.unwrap_or(TIMING_CONFIG.gesture.default_click_ms);
        self.segment_swipe(Point::new(x, y), Point::new(x, y), duration_ms)
            .await
    }

    /// Swipe along `points`, spreading `duration_ms` (default 500ms) evenly
    /// across the path's segments
    pub async fn swipe(&mut self, points: &[Point], duration_ms: Option<u64>) -> Result<()> {
        let duration_ms = duration_ms.unwrap_or(TIMING_CONFIG.gesture.default_swipe_ms);
        match points {
            [] => Ok(()),
            [only] => self.segment_swipe(*only, *only, duration_ms).await,
            _ => {
                let segment_ms = duration_ms / (points.len() as u64 - 1);
                for pair in points.windows(2) {
                    self.segment_swipe(pair[0], pair[1], segment_ms).await?;
                }
                Ok(())
            }
        }
    }

    /// Teardown. Nothing persistent to release; kept for contract symmetry
    /// and safe to call any number of times.
    pub async fn release(&mut self) {}

    async fn segment_swipe(&self, from: Point, to: Point, duration_ms: u64) -> Result<()> {
        let (x1, y1, x2, y2) = (
            from.x.to_string(),
            from.y.to_string(),
            to.x.to_string(),
            to.y.to_string(),
        );
        let duration = duration_ms.to_string();
        let output = shell(
            &self.serial,
            &["input", "swipe", &x1, &y1, &x2, &y2, &duration],
        )
        .await?;

        // `input` reports usage errors on stdout rather than via exit code
        if output.to_lowercase().contains("error") {
            return Err(TouchError::Transport(output.trim().to_string()));
        }
        Ok(())
    }
}

/// Parse `wm size` output such as "Physical size: 1080x1920"
fn parse_wm_size(output: &str) -> Option<(u32, u32)> {
    let caps = WM_SIZE_RE.captures(output)?;
    let width = caps[1].parse().ok()?;
    let height = caps[2].parse().ok()?;
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wm_size_physical() {
        assert_eq!(parse_wm_size("Physical size: 1080x1920\n"), Some((1080, 1920)));
    }

    #[test]
    fn parse_wm_size_garbage() {
        assert_eq!(parse_wm_size("wm: command not found"), None);
        assert_eq!(parse_wm_size(""), None);
    }
}
