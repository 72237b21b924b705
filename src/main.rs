//! `tourbridge` binary: listens for controller tokens over UDP and drives an
//! in-memory host, injecting key events with xdotool.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tourbridge::backends::udp::UdpDevice;
use tourbridge::backends::xdotool::XdotoolEffector;
use tourbridge::logger::{self, Logger};
use tourbridge::sim::{PresetStore, RecordingEffector, SimHost};
use tourbridge::{
    listener, BridgeConfig, Dispatcher, Effector, EventFilter, InputEventBus, ScriptBridge,
};

const TICK: Duration = Duration::from_millis(50);

/// Route TourBox tokens into editor actions
#[derive(Parser, Debug)]
#[command(name = "tourbridge", version, about)]
struct CliArgs {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the UDP listen address
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Log level for this crate when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// JSON file holding brush presets; loaded at start and saved on exit
    #[arg(long, value_name = "FILE")]
    presets: Option<PathBuf>,

    /// Record key events instead of running the effector program
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    logger::init(&args.log_level);

    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.transport.bind = bind;
    }

    let store = match &args.presets {
        Some(path) => PresetStore::load(path)
            .with_context(|| format!("loading presets {}", path.display()))?,
        None => PresetStore::default(),
    };
    let draw = store.brushes.get("Draw").cloned().unwrap_or_default();
    let host = SimHost::new().with_store(store).with_brush("Draw", draw);

    let effector: Box<dyn Effector> = if args.dry_run {
        Box::new(RecordingEffector::new())
    } else {
        Box::new(XdotoolEffector::new(&config.effector))
    };
    let clipboard = Box::new(ScriptBridge::new(config.clipboard.clone()));
    let mut dispatcher = Dispatcher::new(&config, host, effector, clipboard);

    let device = UdpDevice::bind(&config.transport)?;
    let mut bus = InputEventBus::new();
    bus.add_listener(Logger::new(), EventFilter::All);
    let handle = listener::spawn(device, bus.sender(), &config.transport)
        .context("starting listener thread")?;

    while !handle.is_finished() {
        bus.pump_timeout(&mut dispatcher, TICK);
        dispatcher.tick();
    }
    let reason = handle.join();
    while bus.pump(&mut dispatcher) > 0 {}
    info!(?reason, "bridge stopped");

    if let Some(path) = &args.presets {
        let (host, _) = dispatcher.into_parts();
        host.store()
            .save(path)
            .with_context(|| format!("saving presets {}", path.display()))?;
        info!(file = %path.display(), "presets saved");
    }
    Ok(())
}
