//! `sanad-server`: HTTP front end for the document library and extraction.
//!
//! Configuration comes from the file named by `SANAD_CONFIG`, else defaults.
//! Log filtering follows `RUST_LOG` (default `info`).

mod api;
mod state;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use sanad::{load_config_from_env, Database};

use crate::api::router::api_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    // The database layer logs through `log`.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records into tracing: {e}");
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {e}");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "sanad-server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_from_env()?;
    let db = Database::open(&config.database_path())?;
    let state = AppState::from_config(db, &config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        version = env!("CARGO_PKG_VERSION"),
        ocr_enabled = config.ocr.enabled,
        "sanad-server listening"
    );

    axum::serve(listener, api_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sanad-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
