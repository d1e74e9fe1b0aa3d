//! Timing and transport configuration for touch backends

use lazy_static::lazy_static;
use std::env;

/// Gesture timing defaults
#[derive(Debug, Clone)]
pub struct GestureTimingConfig {
    pub default_click_ms: u64,
    pub default_swipe_ms: u64,
}

impl Default for GestureTimingConfig {
    fn default() -> Self {
        Self {
            default_click_ms: env::var("MTC_CLICK_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            default_swipe_ms: env::var("MTC_SWIPE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
        }
    }
}

/// Transport configuration for adb and forwarded sockets
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub adb_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Base of the per-session forward port sequence; each socket session
    /// takes the next port
    pub forward_port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            adb_timeout_secs: env::var("MTC_ADB_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            connect_timeout_secs: env::var("MTC_CONNECT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            forward_port: env::var("MTC_FORWARD_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1111),
        }
    }
}

/// Master configuration
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    pub gesture: GestureTimingConfig,
    pub transport: TransportConfig,
}

lazy_static! {
    /// Global configuration instance, read from MTC_* environment variables once
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}
