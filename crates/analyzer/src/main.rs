//! gamepad-analyzer
//!
//! Inspects USB game controllers: lists candidates, prints their descriptor
//! tree, performs the protocol handshake and dumps input reports.

use analyzer::config::AnalyzerConfig;
use analyzer::gamepad::Protocol;
use analyzer::session::{Session, SessionSettings, SessionSummary};
use analyzer::usb::{self, SelectedEndpoints};
use analyzer::{report, select};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use common::{VidPid, setup_logging};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tracing::{debug, info, warn};

const INSTALL_HINT: &str =
    "libusb backend missing.\nMacOS: brew install libusb\nLinux: apt install libusb-1.0-0-dev";

#[derive(Parser, Debug)]
#[command(name = "gamepad-analyzer")]
#[command(
    author,
    version,
    about = "Gamepad analyzer - inspect and handshake USB game controllers"
)]
#[command(long_about = "
Finds attached game controllers (HID and vendor-specific devices, plus known
controller vendors), prints their configuration and endpoints, claims the
controller interface, sends the wake-up handshake for its protocol and
monitors input reports.

EXAMPLES:
    # Pick a controller interactively
    gamepad-analyzer

    # Analyze a specific controller
    gamepad-analyzer --device 045e:028e

    # Only list detected controllers
    gamepad-analyzer --list

    # Check where the libusb header and library are found
    gamepad-analyzer --doctor

CONFIGURATION:
    The analyzer looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/gamepad-usb/analyzer.toml
    3. /etc/gamepad-usb/analyzer.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// List detected controllers and exit
    #[arg(long)]
    list: bool,

    /// Analyze the controller with this VID:PID instead of prompting
    #[arg(short, long, value_name = "VID:PID")]
    device: Option<VidPid>,

    /// Report libusb header and runtime status and exit
    #[arg(long)]
    doctor: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = AnalyzerConfig::default();
        let path = AnalyzerConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        AnalyzerConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        AnalyzerConfig::load_or_default()
    };

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.analyzer.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("gamepad-analyzer v{}", env!("CARGO_PKG_VERSION"));

    if args.doctor {
        return doctor(&config);
    }

    let context = rusb::Context::new().context(INSTALL_HINT)?;
    let candidates = usb::list_candidates(&context, &config.usb.filters)
        .context("Failed to enumerate USB devices")?;

    if candidates.is_empty() {
        println!("No compatible controllers found");
        return Ok(());
    }

    let mut out = io::stdout();
    report::write_device_list(&mut out, &candidates)?;
    if args.list {
        return Ok(());
    }

    let index = match args.device {
        Some(id) => {
            let summaries: Vec<_> = candidates.iter().map(|c| &c.summary).collect();
            select::find_by_id(&summaries, id)?
        }
        None => prompt_selection(candidates.len()).await?,
    };
    let candidate = &candidates[index];

    report::write_device(&mut out, &candidate.summary)?;
    let endpoints = match usb::enumerate::read_configuration(&candidate.device) {
        Ok(cfg) => {
            report::write_configuration(&mut out, &cfg)?;
            SelectedEndpoints::select(&cfg).interrupt_only(&cfg)
        }
        Err(e) => {
            writeln!(out, "  [ERROR] Structure analysis failed: {}", e)?;
            SelectedEndpoints::default()
        }
    };
    debug!("Selected endpoints: {:?}", endpoints);

    let id = candidate.summary.id;
    let protocol = candidate.summary.detected_protocol();
    let settings = SessionSettings::from(&config);

    // rusb handles are closed before the bridge opens the device.
    drop(candidates);
    drop(context);

    let stop = Arc::new(AtomicBool::new(false));
    let mut task = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        move || run_session(id, protocol, endpoints, settings, &stop)
    });

    let joined = tokio::select! {
        res = &mut task => res,
        _ = signal::ctrl_c() => {
            println!("\nAborted by user");
            stop.store(true, Ordering::Relaxed);
            task.await
        }
    };
    let summary = joined.context("USB session task failed")??;

    if summary.access_denied {
        warn!("Interface claim was refused: insufficient permissions");
    }
    info!(
        "Session finished: claimed={}, handshake {}/{} sent, {} report(s)",
        summary.claimed,
        summary.init_sent,
        summary.init_sent + summary.init_failed,
        summary.reports.len()
    );

    Ok(())
}

/// Open the device through the bridge and run the session to completion
fn run_session(
    id: VidPid,
    protocol: Protocol,
    endpoints: SelectedEndpoints,
    settings: SessionSettings,
    stop: &AtomicBool,
) -> Result<SessionSummary> {
    let context = libusb_bridge::Context::new().context("Failed to initialize libusb context")?;
    let handle = context
        .open_device_with_vid_pid(id.vendor_id, id.product_id)
        .ok_or_else(|| anyhow!("Could not open device {} (disconnected or no permission)", id))?;

    let mut session = Session::new(&handle, settings);
    let mut out = io::stdout();
    let summary = session.run(protocol, endpoints, &mut out, stop)?;
    session.close();

    Ok(summary)
}

/// Read the menu choice on a blocking thread so the runtime stays free
async fn prompt_selection(count: usize) -> Result<usize> {
    tokio::task::spawn_blocking(move || {
        select::prompt_selection(io::stdin().lock(), &mut io::stdout(), count)
    })
    .await
    .context("Selection prompt task failed")?
}

/// Report where the libusb header lives and whether the runtime initializes
fn doctor(config: &AnalyzerConfig) -> Result<()> {
    let version = rusb::version();
    println!(
        "libusb runtime: {}.{}.{}",
        version.major(),
        version.minor(),
        version.micro()
    );

    match libusb_bridge::Context::new() {
        Ok(_) => println!("libusb context: ok"),
        Err(e) => println!("libusb context: failed ({})", e),
    }

    let dirs = config.analyzer.resolved_include_dirs();
    let header = libusb_bridge::locate_header(&dirs)?;
    println!("libusb header: {}", header);
    println!("  {}", header.include_directive());
    Ok(())
}
