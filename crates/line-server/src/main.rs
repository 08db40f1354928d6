use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::health::{MachineHealthMonitor, MachineMonitoringService};
use application::machine::MachineManager;
use domain::machine::PositionConfiguration;
use infrastructure::{
    BroadcastEventPublisher, LineSettings, SimulatorFactory, StaticPositionConfiguration,
};

use line_server::{api, state::AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API port (overrides configuration)
    #[arg(long)]
    api_port: Option<u16>,

    /// Configuration directory
    #[arg(long, default_value = "config")]
    config_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,line_server=debug")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    dotenv::dotenv().ok();
    info!("Line Control Server starting...");

    // 0. Load settings
    let settings = match LineSettings::load(&args.config_dir) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, using defaults");
            LineSettings::default()
        }
    };

    // 1. Wire the line
    let shutdown = CancellationToken::new();

    let publisher = Arc::new(BroadcastEventPublisher::new(256));
    let events = publisher.sender();

    let positions: Arc<dyn PositionConfiguration> = match settings.positions.clone() {
        Some(map) => Arc::new(StaticPositionConfiguration::from_map(
            map,
            settings.fallback_endpoint.clone(),
        )),
        None => Arc::new(StaticPositionConfiguration::new()),
    };
    info!(count = %positions.all_positions().len(), "Line topology loaded");

    let factory = Arc::new(SimulatorFactory::new(
        positions.clone(),
        publisher.clone(),
        settings.simulation.clone(),
        shutdown.clone(),
    ));
    let manager = Arc::new(MachineManager::new(factory));
    let health_monitor = Arc::new(MachineHealthMonitor::new(
        manager.clone(),
        positions.clone(),
    ));

    // 2. Start the monitoring loop
    let monitoring = MachineMonitoringService::new(
        health_monitor.clone(),
        manager.clone(),
        settings.monitor.clone(),
    );
    let monitor_token = shutdown.child_token();
    let monitor_handle = tokio::spawn(async move {
        monitoring.run(monitor_token).await;
    });

    // 3. Start API server
    let state = Arc::new(AppState::new(
        manager.clone(),
        health_monitor,
        positions,
        events,
    ));
    let app = api::create_router(state);

    let port = args.api_port.unwrap_or(settings.server.api_port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 4. Drain: stop monitoring, cancel in-flight connects, drop all sessions
    info!("Shutting down...");
    shutdown.cancel();
    let _ = monitor_handle.await;
    manager.disconnect_all().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
