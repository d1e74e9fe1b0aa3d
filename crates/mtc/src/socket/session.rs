//! Forwarded-socket session shared by the minitouch and maatouch backends
//!
//! Lifecycle: spawn the on-device daemon over `adb shell`, forward a local
//! TCP port to its abstract socket, connect, and read the protocol header.
//! Each session takes its own local port so sessions against different
//! devices (or minitouch and maatouch side by side) never share a forward.
//! Teardown is best-effort and idempotent: socket shutdown, daemon kill and
//! forward removal all swallow their own failures.

use crate::adb::{adb_prefix, forward, forward_remove};
use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use std::process::Stdio;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Capability descriptor from the protocol header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub version: u32,
    pub max_contacts: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub max_pressure: u32,
    pub pid: u32,
}

static PORT_OFFSET: AtomicU16 = AtomicU16::new(0);

/// Hand out a distinct local port per session, counting up from the
/// configured base.
fn next_forward_port() -> u16 {
    let base = TIMING_CONFIG.transport.forward_port;
    base.wrapping_add(PORT_OFFSET.fetch_add(1, Ordering::Relaxed))
}

/// One live daemon session over a forwarded local socket
pub(crate) struct TouchSession {
    serial: String,
    local_port: u16,
    daemon: Option<Child>,
    writer: Option<OwnedWriteHalf>,
    info: SessionInfo,
}

impl TouchSession {
    /// Spawn `daemon_cmd` on the device, forward a fresh local port to
    /// `socket_name` and complete the protocol handshake.
    pub(crate) async fn open(
        serial: &str,
        socket_name: &str,
        daemon_cmd: &[&str],
    ) -> Result<Self> {
        let prefix = adb_prefix(Some(serial));
        let mut cmd = Command::new(&prefix[0]);
        for arg in &prefix[1..] {
            cmd.arg(arg);
        }
        cmd.arg("shell");
        for arg in daemon_cmd {
            cmd.arg(arg);
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd.kill_on_drop(true);
        let daemon = cmd.spawn().map_err(TouchError::Io)?;

        let local_port = next_forward_port();
        forward(serial, local_port, socket_name).await?;

        // The forward is live from here on; do not leak it past a failed
        // connect or handshake.
        match complete_handshake(local_port).await {
            Ok((writer, info)) => Ok(Self {
                serial: serial.to_string(),
                local_port,
                daemon: Some(daemon),
                writer: Some(writer),
                info,
            }),
            Err(err) => {
                if let Err(remove_err) = forward_remove(serial, local_port).await {
                    warn!(serial, %remove_err, "forward removal after failed handshake");
                }
                Err(err)
            }
        }
    }

    pub(crate) fn info(&self) -> SessionInfo {
        self.info
    }

    /// Send one protocol line (newline appended)
    pub(crate) async fn send(&mut self, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| TouchError::Transport("session already closed".to_string()))?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| TouchError::Transport(e.to_string()))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| TouchError::Transport(e.to_string()))?;
        Ok(())
    }

    /// Best-effort teardown; safe to call more than once
    pub(crate) async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.shutdown().await {
                warn!(serial = %self.serial, %err, "socket shutdown failed");
            }
        }
        if let Some(mut daemon) = self.daemon.take() {
            if let Err(err) = daemon.kill().await {
                warn!(serial = %self.serial, %err, "daemon kill failed");
            }
            if let Err(err) = forward_remove(&self.serial, self.local_port).await {
                warn!(serial = %self.serial, %err, "forward removal failed");
            }
        }
    }
}

/// Connect to the forwarded port and read the header lines through the
/// terminating `$` line.
async fn complete_handshake(local_port: u16) -> Result<(OwnedWriteHalf, SessionInfo)> {
    let stream = connect_with_retry(local_port).await?;
    let (read_half, writer) = stream.into_split();

    let mut lines = BufReader::new(read_half).lines();
    let mut header = Vec::new();
    loop {
        let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
            .await
            .map_err(|_| TouchError::Connection("handshake timed out".to_string()))?
            .map_err(TouchError::Io)?
            .ok_or_else(|| TouchError::Connection("socket closed during handshake".to_string()))?;
        debug!(%line, "handshake line");
        let done = line.starts_with('$');
        header.push(line);
        if done {
            break;
        }
        if header.len() > 32 {
            return Err(TouchError::Connection(
                "handshake never completed".to_string(),
            ));
        }
    }
    let info = parse_header(&header)?;
    Ok((writer, info))
}

async fn connect_with_retry(local_port: u16) -> Result<TcpStream> {
    let deadline = Duration::from_secs(TIMING_CONFIG.transport.connect_timeout_secs);
    let started = tokio::time::Instant::now();
    loop {
        match TcpStream::connect(("127.0.0.1", local_port)).await {
            Ok(stream) => return Ok(stream),
            Err(err) if started.elapsed() < deadline => {
                debug!(%err, "daemon socket not ready, retrying");
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Err(err) => {
                return Err(TouchError::Connection(format!(
                    "could not reach forwarded socket on port {}: {}",
                    local_port, err
                )))
            }
        }
    }
}

/// Parse the protocol header:
///
/// ```text
/// v <version>
/// ^ <max-contacts> <max-x> <max-y> <max-pressure>
/// $ <pid>
/// ```
pub(crate) fn parse_header(lines: &[String]) -> Result<SessionInfo> {
    let mut version = None;
    let mut limits = None;
    let mut pid = None;

    for line in lines {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => {
                version = fields.next().and_then(|v| v.parse().ok());
            }
            Some("^") => {
                let vals: Vec<u32> = fields.filter_map(|v| v.parse().ok()).collect();
                if vals.len() == 4 {
                    limits = Some((vals[0], vals[1], vals[2], vals[3]));
                }
            }
            Some("$") => {
                pid = fields.next().and_then(|v| v.parse().ok());
            }
            _ => {}
        }
    }

    let version =
        version.ok_or_else(|| TouchError::Parse("handshake missing version line".to_string()))?;
    let (max_contacts, max_x, max_y, max_pressure) =
        limits.ok_or_else(|| TouchError::Parse("handshake missing limits line".to_string()))?;
    let pid = pid.ok_or_else(|| TouchError::Parse("handshake missing pid line".to_string()))?;

    Ok(SessionInfo {
        version,
        max_contacts,
        max_x,
        max_y,
        max_pressure,
        pid,
    })
}
