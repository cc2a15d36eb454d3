mod api;
mod config;
mod dataset;
mod error;
mod estimator;
mod journal;
mod state;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::PredictionLatency;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::dataset::load_snapshot;
use crate::error::Result;
use crate::journal::spawn_journal;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Dataset: loaded once, immutable for the process lifetime ---
    let (snapshot, _load_stats) = load_snapshot(&cfg.dataset_path)?;
    let snapshot = Arc::new(snapshot);

    // --- Prediction journal ---
    let health = Arc::new(HealthState::new());
    let journal_path = PathBuf::from(&cfg.prediction_log_path);
    let (journal, _journal_task) = spawn_journal(journal_path.clone(), Arc::clone(&health));
    info!("Prediction journal at {}", journal_path.display());

    // --- HTTP API server ---
    let api_state = ApiState {
        snapshot,
        journal,
        journal_path,
        currency: cfg.currency.clone(),
        health,
        latency: Arc::new(PredictionLatency::new()),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
