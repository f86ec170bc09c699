//! Hygronode - humidity sensor node host runner.
//!
//! Runs the duty-cycle controller against a simulated sensor, a log-backed
//! display and a real UDP multicast socket.
//!
//! Run with: `cargo run -p hygronode -- --sample-period 5 --verbose`

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hygronode_core::{Controller, NodeConfig, TracingDisplay, UdpMulticastTransport};

mod sim;

use sim::SimulatedSensor;

/// Hygronode - duty-cycled humidity and temperature broadcaster.
#[derive(Parser, Debug)]
#[command(name = "hygronode")]
#[command(version, about, long_about = None)]
struct Args {
    /// Stop after this many cycles (runs until Ctrl-C otherwise).
    #[arg(short, long)]
    cycles: Option<u64>,

    /// Seconds between cycles.
    #[arg(short, long, default_value_t = 60)]
    sample_period: u64,

    /// Local interface address to send from.
    #[arg(short, long)]
    interface: Option<Ipv4Addr>,

    /// Node identifier placed in every message.
    #[arg(long)]
    node_id: Option<String>,

    /// Seed for the simulated sensor.
    #[arg(long)]
    seed: Option<u64>,

    /// Log policy decisions and display frames.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("hygronode={}", level).parse()?)
                .add_directive(format!("hygronode_core={}", level).parse()?),
        )
        .init();

    let mut config = NodeConfig::default().sample_period(Duration::from_secs(args.sample_period));
    if let Some(interface) = args.interface {
        config = config.interface(interface);
    }
    if let Some(node_id) = args.node_id {
        config = config.node_id(node_id);
    }

    let sensor = match args.seed {
        Some(seed) => SimulatedSensor::seeded(seed),
        None => SimulatedSensor::new(),
    };
    let transport = UdpMulticastTransport::new(&config);
    let mut node = Controller::new(config, sensor, TracingDisplay::new(), transport)?;

    node.boot().await?;

    match args.cycles {
        Some(cycles) => {
            info!("Running {} cycles", cycles);
            node.run_for(cycles).await;
        }
        None => {
            info!(
                "Sampling every {:?}, press Ctrl-C to stop",
                node.config().sample_period
            );
            node.run_until(shutdown_signal()).await;
        }
    }

    info!("Stats: {}", serde_json::to_string(node.stats())?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
