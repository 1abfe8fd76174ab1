use std::sync::Arc;

use payroll_engine::api::{create_router, AppState};
use payroll_engine::config::ConfigLoader;
use payroll_engine::engine::PayrollEngine;
use payroll_engine::store::{seed_roster, MemoryStore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the YAML configuration file.
const CONFIG_ENV: &str = "PAYROLL_CONFIG";

/// `RUST_LOG` directives when set and valid, otherwise `info`.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!(path = %path, "Loading configuration");
            ConfigLoader::load(&path)?
        }
        Err(_) => {
            info!("No {} set; using default configuration", CONFIG_ENV);
            ConfigLoader::default()
        }
    };

    let store = Arc::new(MemoryStore::new());
    seed_roster(&store, &config.config().seed).await;
    let engine = PayrollEngine::with_store(store, config.config().clone());
    let bind_address = config.config().bind_address.clone();
    let app = create_router(AppState::new(engine, config));

    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Payroll engine listening");
    axum::serve(listener, app).await?;

    Ok(())
}
