//! CardVault Server - Web Server Entry Point
//!
//! Starts the HTTP server for card search, card CRUD and the admin endpoints.

use anyhow::Context;
use cardvault::{api::create_router, config::Config, logging, state::AppState};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cardvault-server", version, about = "CardVault card search service")]
struct Args {
    /// Configuration file (YAML, TOML or JSON); defaults to ./config.*
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serve from the in-memory card store instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration first to get logging settings
    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if args.in_memory {
        config.database.in_memory = true;
    }

    // Validate configuration
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    // Initialize logging based on configuration
    let _telemetry_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging/telemetry")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.logging.deployment_environment,
        "Starting CardVault server"
    );

    let addr = config
        .socket_addr()
        .context("Failed to determine socket address")?;

    tracing::info!(
        listen_addr = %addr,
        in_memory = config.database.in_memory,
        cache_capacity = config.cache.capacity,
        "Configuration loaded"
    );

    let (state, analytics_worker) = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    let db_pool = state.db_pool.clone();

    // Create router
    let app = create_router(state);

    // Start server
    tracing::info!("CardVault listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Search endpoint: http://{}/api/cards/search", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Flush queued analytics before the pool goes away.
    if let Some(worker) = analytics_worker {
        worker.shutdown().await;
    }
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    if let Err(e) = served {
        tracing::error!(error = %e, "Server terminated unexpectedly");
        logging::shutdown_telemetry();
        return Err(e.into());
    }

    tracing::info!("Server shutdown complete");

    // Explicitly shutdown telemetry (also happens via Drop on _telemetry_guard)
    logging::shutdown_telemetry();

    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
/// Docker sends SIGTERM, while Ctrl+C sends SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler; only Ctrl+C will stop the server");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    let sigint = tokio::signal::ctrl_c();

    tokio::select! {
        _ = sigint => {
            tracing::info!("SIGINT received, starting graceful shutdown...");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, starting graceful shutdown...");
        }
    }
}

/// Wait for shutdown signal (SIGINT only on non-Unix platforms)
#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
