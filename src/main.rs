//! Indyscan Realtime Server
//!
//! Run with: cargo run -- --simulate sovmain,sovstaging
//!
//! # Configuration
//!
//! Settings come from `--config <path>` or the default locations searched by
//! [`Config::load_default`], with environment overrides applied on top.
//! `RUST_LOG` takes precedence over the configured log level.

use anyhow::Context;
use clap::Parser;
use indyscan_realtime::api::{serve, ApiConfig, AppState};
use indyscan_realtime::bridge::EventBridge;
use indyscan_realtime::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use indyscan_realtime::websocket::HubConfig;
use indyscan_realtime::worker::{ServiceWorkers, Worker, WorkerHandle, WorkerInfo};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "indyscan-realtime", version, about = "Realtime ledger event server")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Run simulated expansion workers for these network ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    simulate: Vec<String>,

    /// Interval between simulated transactions
    #[arg(long, default_value_t = 1000)]
    simulate_interval_ms: u64,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let loaded = match &args.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };
    let mut config = loaded.config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);
    loaded.report();

    tracing::info!("Starting Indyscan realtime server v{}", env!("CARGO_PKG_VERSION"));

    let (workers, simulations) = simulated_workers(
        &args.simulate,
        config.hub.worker_event_capacity,
        Duration::from_millis(args.simulate_interval_ms.max(1)),
    );
    if workers.is_empty() {
        tracing::warn!("No workers registered; clients will not receive events");
    }
    let workers = Arc::new(workers);

    let api_config = ApiConfig::from(&config.server);
    let state = AppState::with_hub_config(
        workers.clone(),
        api_config.clone(),
        HubConfig::from(&config.hub),
    );

    let bridge = EventBridge::attach(workers.as_ref(), Arc::clone(&state.directory));
    tracing::info!(networks = ?bridge.linked_networks(), "Workers linked");

    serve(state, &api_config).await?;

    bridge.shutdown();
    for simulation in simulations {
        simulation.abort();
    }
    tracing::info!("Indyscan realtime server stopped");

    Ok(())
}

/// Install the tracing subscriber described by the logging config
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("indyscan_realtime={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Build expansion workers that emit synthetic events
fn simulated_workers(
    networks: &[String],
    capacity: usize,
    interval: Duration,
) -> (ServiceWorkers, Vec<JoinHandle<()>>) {
    let mut workers = ServiceWorkers::new();
    let mut tasks = Vec::new();

    for (id, network) in networks.iter().filter(|n| !n.is_empty()).enumerate() {
        let handle = Arc::new(WorkerHandle::with_capacity(
            WorkerInfo::new("expansion", network.as_str(), "domain"),
            capacity,
        ));
        workers.push(handle.clone() as Arc<dyn Worker>);

        tracing::info!(indy_network_id = %network, "Simulating expansion worker");
        tasks.push(tokio::spawn(simulate(handle, id, interval)));
    }

    (workers, tasks)
}

async fn simulate(worker: Arc<WorkerHandle>, id: usize, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    let mut seq_no: u64 = 0;
    let rescan_delay = rescan_delay_ms(interval);
    let worker_data = json!({
        "id": format!("{}-domain-expansion", worker.info().indy_network_id),
        "index": id,
    });

    loop {
        ticker.tick().await;
        seq_no += 1;
        worker.events().emit_tx_processed(
            worker_data.clone(),
            json!({ "seqNo": seq_no, "subledger": worker.info().subledger }),
        );
        if seq_no % 10 == 0 {
            worker
                .events()
                .emit_rescan_scheduled(worker_data.clone(), json!(rescan_delay));
        }
    }
}

/// Simulated workers announce a rescan five ticks out
fn rescan_delay_ms(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis())
        .unwrap_or(u64::MAX)
        .saturating_mul(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescan_delay() {
        assert_eq!(rescan_delay_ms(Duration::from_millis(1000)), 5000);
        assert_eq!(rescan_delay_ms(Duration::from_millis(u64::MAX / 4)), u64::MAX);
        assert_eq!(rescan_delay_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_simulate_list_is_comma_separated() {
        let args = Args::parse_from(["indyscan-realtime", "--simulate", "sovmain,sovstaging"]);
        assert_eq!(args.simulate, vec!["sovmain", "sovstaging"]);
        assert_eq!(args.simulate_interval_ms, 1000);
    }
}
