use anyhow::{Context, Result};
use clap::Parser;
use kvmon_collector::Supervisor;
use kvmon_server::app;
use kvmon_server::config::{KvmonConfig, StartupArgs};
use kvmon_server::state::AppState;
use kvmon_storage::MetricStore;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kvmon=info".parse()?))
        .init();

    // Exits with a usage error if any of the three settings is missing.
    let args = StartupArgs::parse();

    let config = KvmonConfig::load(&args.config_file)?;
    let targets = config.targets();

    tracing::info!(
        config = %args.config_file,
        consul = %args.consul_base_uri,
        targets = targets.len(),
        poll_interval_secs = config.poll_interval_secs,
        "kvmon starting"
    );

    let store = Arc::new(MetricStore::new().context("Failed to create metric store")?);

    let bind_addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    let shutdown = CancellationToken::new();
    let supervisor = Supervisor::start(
        targets,
        &args.consul_base_uri,
        store.clone(),
        config.poll_interval(),
        shutdown.clone(),
    )?;

    let state = AppState::new(store, supervisor.poller_count());
    let http_app = app::build_http_app(state);

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutting down gracefully");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    tracing::info!(addr = %bind_addr, "Starting Prometheus exporter");

    let server_token = shutdown.clone();
    let served = axum::serve(listener, http_app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await;

    supervisor.shutdown().await;
    served.context("HTTP server error")?;

    tracing::info!("kvmon stopped");
    Ok(())
}
