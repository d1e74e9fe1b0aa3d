//! mtc CLI - smoke harness for the touch backends
//!
//! Usage:
//!     mtc [OPTIONS]
//!
//! Environment Variables:
//!     MTC_DEVICE_ID: ADB device serial for multi-device setups
//!     MTC_MUMU_PATH: MuMu install directory (registry-style lookup)
//!     MTC_CLICK_MS / MTC_SWIPE_MS: default gesture durations

use anyhow::{anyhow, Result};
use clap::Parser;
use mtc::{
    AdbTouch, BackendKind, MaaTouch, MiniTouch, MumuOptions, MumuTouch, Point, TouchBackend,
    TouchError,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// mtc - mobile touch control smoke harness
#[derive(Parser, Debug)]
#[command(name = "mtc")]
#[command(about = "Exercise click/swipe against a touch backend")]
#[command(after_help = r#"Examples:
    # Click on the first adb device
    mtc --x 100 --y 100

    # Swipe over minitouch on a specific device
    mtc --backend minitouch -d emulator-5554 \
        --points '[[100,100],[200,200],[300,300]]' --duration 500

    # MuMu emulator instance 0
    mtc --backend mumu --instance 0 --x 100 --y 100

    # List connected devices
    mtc --list-devices

    # Smoke-test every backend in turn
    mtc --all
"#)]
struct Cli {
    /// Backend to exercise
    #[arg(long, default_value = "adb", value_parser = ["adb", "minitouch", "maatouch", "mumu"])]
    backend: String,

    /// ADB device serial
    #[arg(short = 'd', long, env = "MTC_DEVICE_ID")]
    device_id: Option<String>,

    /// List connected devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Run the click/swipe smoke sequence against every backend and exit
    #[arg(long)]
    all: bool,

    /// MuMu install directory (falls back to MTC_MUMU_PATH, then to the
    /// conventional install locations)
    #[arg(long)]
    install_path: Option<PathBuf>,

    /// MuMu emulator instance number
    #[arg(long, default_value = "0")]
    instance: u32,

    /// Logical sub-display id
    #[arg(long, default_value = "0")]
    display_id: u32,

    /// Click x coordinate
    #[arg(long, default_value = "100")]
    x: i32,

    /// Click y coordinate
    #[arg(long, default_value = "100")]
    y: i32,

    /// Swipe path as a JSON array of [x, y] pairs
    #[arg(long, value_name = "JSON")]
    points: Option<String>,

    /// Gesture duration in milliseconds (backend defaults when omitted)
    #[arg(long)]
    duration: Option<u64>,

    /// Suppress verbose output
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn parse_points(raw: &str) -> Result<Vec<Point>> {
    let pairs: Vec<(i32, i32)> =
        serde_json::from_str(raw).map_err(|e| anyhow!("invalid --points: {}", e))?;
    Ok(pairs.into_iter().map(Point::from).collect())
}

fn require_adb() -> Result<()> {
    which::which("adb")
        .map(|_| ())
        .map_err(|_| anyhow!("adb binary not found in PATH"))
}

async fn construct(kind: BackendKind, cli: &Cli) -> Result<TouchBackend, TouchError> {
    let serial = cli.device_id.as_deref();
    match kind {
        BackendKind::Adb => Ok(AdbTouch::connect(serial).await?.into()),
        BackendKind::MiniTouch => Ok(MiniTouch::connect(serial).await?.into()),
        BackendKind::MaaTouch => Ok(MaaTouch::connect(serial).await?.into()),
        BackendKind::Mumu => {
            let options = MumuOptions {
                instance_index: cli.instance,
                install_path: cli.install_path.clone(),
                library_path: None,
                display_id: cli.display_id,
            };
            let touch = MumuTouch::connect(options, |library| {
                // No renderer IPC binding is linked into this harness; the
                // loader is the integration point for one.
                Err(TouchError::Config(format!(
                    "no renderer IPC loader available for {}",
                    library.display()
                )))
            })?;
            Ok(touch.into())
        }
    }
}

async fn run_gestures(backend: &mut TouchBackend, cli: &Cli) -> Result<(), TouchError> {
    backend.click(cli.x, cli.y, cli.duration).await?;
    if let Some(raw) = &cli.points {
        let points = parse_points(raw).map_err(|e| TouchError::Parse(e.to_string()))?;
        backend.swipe(&points, cli.duration).await?;
    }
    Ok(())
}

async fn smoke_one(kind: BackendKind, cli: &Cli) {
    println!("\n== Testing {} ==", kind);
    let mut backend = match construct(kind, cli).await {
        Ok(backend) => backend,
        Err(err) => {
            println!("{} init FAILED: {}", kind, err);
            return;
        }
    };

    let (width, height) = backend.display_size();
    if !cli.quiet {
        println!("display: {}x{}", width, height);
    }

    let result = async {
        backend.click(100, 100, Some(100)).await?;
        backend
            .swipe(
                &[
                    Point::new(100, 100),
                    Point::new(200, 200),
                    Point::new(300, 300),
                ],
                Some(500),
            )
            .await
    }
    .await;

    match result {
        Ok(()) => println!("{} OK", kind),
        Err(err) => println!("{} FAILED: {}", kind, err),
    }

    backend.release().await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if cli.list_devices {
        require_adb()?;
        let devices = mtc::list_devices().await?;
        if devices.is_empty() {
            println!("No devices connected");
        } else {
            for device in devices {
                println!(
                    "{}\t{}\t{}",
                    device.serial,
                    device.status,
                    device.model.as_deref().unwrap_or("-")
                );
            }
        }
        return Ok(());
    }

    if cli.all {
        require_adb()?;
        for kind in [
            BackendKind::Adb,
            BackendKind::MiniTouch,
            BackendKind::MaaTouch,
            BackendKind::Mumu,
        ] {
            smoke_one(kind, &cli).await;
        }
        return Ok(());
    }

    let kind: BackendKind = cli.backend.parse().map_err(|e: String| anyhow!(e))?;
    if kind != BackendKind::Mumu {
        require_adb()?;
    }

    let mut backend = construct(kind, &cli)
        .await
        .map_err(|e| anyhow!("{} init failed: {}", kind, e))?;

    let (width, height) = backend.display_size();
    if !cli.quiet {
        println!("connected to {} backend, display {}x{}", kind, width, height);
    }

    let result = run_gestures(&mut backend, &cli).await;
    backend.release().await;
    result.map_err(|e| anyhow!("{} gesture failed: {}", kind, e))?;

    if !cli.quiet {
        println!("{} OK", kind);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_points_json_pairs() {
        let points = parse_points("[[100,100],[200,200]]").unwrap();
        assert_eq!(points, vec![Point::new(100, 100), Point::new(200, 200)]);
    }

    #[test]
    fn parse_points_rejects_garbage() {
        assert!(parse_points("not json").is_err());
        assert!(parse_points("[[1]]").is_err());
    }
}
