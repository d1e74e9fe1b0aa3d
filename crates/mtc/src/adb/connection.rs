//! ADB command plumbing shared by the shell and forwarded-socket backends

use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use std::time::Duration;
use tokio::process::Command;

/// Type of ADB connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Usb,
    Remote,
}

/// Information about a connected device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub serial: String,
    pub status: String,
    pub connection_type: ConnectionType,
    pub model: Option<String>,
}

impl DeviceInfo {
    pub fn is_ready(&self) -> bool {
        self.status == "device"
    }
}

/// Build ADB command prefix with optional device specifier
pub(crate) fn adb_prefix(serial: Option<&str>) -> Vec<String> {
    let mut prefix = vec!["adb".to_string()];
    if let Some(serial) = serial {
        prefix.push("-s".to_string());
        prefix.push(serial.to_string());
    }
    prefix
}

/// Run an adb command and return its combined stdout/stderr.
///
/// Non-zero exit codes are not treated as failures here; callers that care
/// inspect the output. A missing adb binary or a timeout does fail.
pub(crate) async fn run_adb(serial: Option<&str>, args: &[&str]) -> Result<String> {
    let prefix = adb_prefix(serial);
    let mut cmd = Command::new(&prefix[0]);
    for arg in &prefix[1..] {
        cmd.arg(arg);
    }
    for arg in args {
        cmd.arg(arg);
    }

    let timeout = Duration::from_secs(TIMING_CONFIG.transport.adb_timeout_secs);
    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| TouchError::Timeout(format!("adb {} timed out", args.join(" "))))?
        .map_err(TouchError::Io)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(format!("{}{}", stdout, stderr))
}

/// Run `adb shell <args>` against a specific device
pub(crate) async fn shell(serial: &str, args: &[&str]) -> Result<String> {
    let mut full = vec!["shell"];
    full.extend_from_slice(args);
    run_adb(Some(serial), &full).await
}

/// List all connected devices
pub async fn list_devices() -> Result<Vec<DeviceInfo>> {
    let output = run_adb(None, &["devices", "-l"]).await?;
    Ok(parse_device_list(&output))
}

/// Parse `adb devices -l` output
fn parse_device_list(output: &str) -> Vec<DeviceInfo> {
    let mut devices = Vec::new();

    for line in output.lines().skip(1) {
        // Skip header line
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            let serial = parts[0].to_string();
            let status = parts[1].to_string();

            let connection_type = if serial.contains(':') {
                ConnectionType::Remote
            } else {
                ConnectionType::Usb
            };

            let mut model = None;
            for part in &parts[2..] {
                if let Some(value) = part.strip_prefix("model:") {
                    model = Some(value.to_string());
                    break;
                }
            }

            devices.push(DeviceInfo {
                serial,
                status,
                connection_type,
                model,
            });
        }
    }

    devices
}

/// Resolve a device serial: an explicit serial must be listed and ready,
/// otherwise the first ready device wins.
pub async fn resolve_serial(serial: Option<&str>) -> Result<String> {
    let devices = list_devices().await?;

    match serial {
        Some(serial) => devices
            .iter()
            .find(|d| d.serial == serial && d.is_ready())
            .map(|d| d.serial.clone())
            .ok_or_else(|| TouchError::Config(format!("device not found: {}", serial))),
        None => devices
            .iter()
            .find(|d| d.is_ready())
            .map(|d| d.serial.clone())
            .ok_or_else(|| TouchError::Config("no adb devices available".to_string())),
    }
}

/// Forward a local TCP port to an abstract socket on the device
pub(crate) async fn forward(serial: &str, local_port: u16, socket_name: &str) -> Result<()> {
    let local = format!("tcp:{}", local_port);
    let remote = format!("localabstract:{}", socket_name);
    let output = run_adb(Some(serial), &["forward", &local, &remote]).await?;

    let lower = output.to_lowercase();
    if lower.contains("error") || lower.contains("cannot") {
        return Err(TouchError::Connection(output.trim().to_string()));
    }
    Ok(())
}

/// Remove a port forward; failure only matters to teardown, which swallows it
pub(crate) async fn forward_remove(serial: &str, local_port: u16) -> Result<()> {
    let local = format!("tcp:{}", local_port);
    run_adb(Some(serial), &["forward", "--remove", &local]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_device_list_skips_header_and_blank_lines() {
        let output = "List of devices attached\n\
                      emulator-5554\tdevice product:sdk model:sdk_gphone64 device:emu64\n\
                      192.168.1.20:5555\toffline\n\n";
        let devices = parse_device_list(output);
        assert_eq!(devices.len(), 2);

        assert_eq!(devices[0].serial, "emulator-5554");
        assert!(devices[0].is_ready());
        assert_eq!(devices[0].connection_type, ConnectionType::Usb);
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64"));

        assert_eq!(devices[1].serial, "192.168.1.20:5555");
        assert!(!devices[1].is_ready());
        assert_eq!(devices[1].connection_type, ConnectionType::Remote);
        assert_eq!(devices[1].model, None);
    }

    #[test]
    fn parse_device_list_empty_output() {
        assert!(parse_device_list("List of devices attached\n").is_empty());
    }

    #[test]
    fn adb_prefix_includes_serial() {
        assert_eq!(adb_prefix(None), vec!["adb"]);
        assert_eq!(
            adb_prefix(Some("emulator-5554")),
            vec!["adb", "-s", "emulator-5554"]
        );
    }
}
