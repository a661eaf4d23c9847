mod server;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use vodhub_api::AppState;
use vodhub_core::{
    logging,
    repository::{NullStore, RedisStore, StorageBackend},
    Config,
};

use server::VodHubServer;

#[derive(Parser, Debug)]
#[command(name = "vodhub")]
#[command(about = "Video catalog gateway", long_about = None)]
struct Args {
    /// Config file (YAML or TOML); environment variables override it
    #[arg(long, env = "VODHUB_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let config = Config::load(args.config.as_deref())?;

    // 1.5. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("vodhub starting...");
    info!("HTTP address: {}", config.http_address());

    // 3. Storage for the metadata index
    let storage: Arc<dyn StorageBackend> = match config.storage.redis_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            info!("Using Redis for the metadata index");
            Arc::new(RedisStore::new(url)?)
        }
        _ => {
            warn!("Redis not configured, synthesized catalog will report no data");
            Arc::new(NullStore)
        }
    };

    if config.openlist.settings().is_none() {
        info!("OpenList not configured, api=openlist requests will be answered empty");
    }

    // 4. Wire services and serve
    let config = Arc::new(config);
    let state = AppState::from_config(Arc::clone(&config), storage)?;

    VodHubServer::new(config, state).start().await
}
