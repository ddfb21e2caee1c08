use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

mod handlers;
mod logger;
mod models;
mod router;
mod state;

use scholarboard_core::{Config, Dashboard, config_file};
use state::AppState;

/// Academic research dashboard API over relational, document and graph stores.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Serve all stores from a JSON fixture instead of connecting
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// SQLite database holding the relational catalog
    #[arg(long)]
    sqlite_path: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(long)]
    mongodb_uri: Option<String>,

    /// Neo4j bolt URI
    #[arg(long)]
    neo4j_uri: Option<String>,

    /// Seconds before a store call is abandoned
    #[arg(long)]
    store_timeout: Option<u64>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.fixture {
            config.fixture_path = Some(path.clone());
        }
        if let Some(path) = &self.sqlite_path {
            config.sqlite_path = Some(path.clone());
        }
        if let Some(uri) = &self.mongodb_uri {
            config.mongodb_uri = uri.clone();
        }
        if let Some(uri) = &self.neo4j_uri {
            config.neo4j_uri = uri.clone();
        }
        if let Some(secs) = self.store_timeout.filter(|s| *s > 0) {
            config.store_timeout = Duration::from_secs(secs);
        }
        if let Some(bind) = &self.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // file < environment < command line
    let mut config = Config::default();
    config_file::load_config().apply_to(&mut config);
    config.apply_env();
    cli.apply_to(&mut config);

    logger::init(&config.log_level)?;
    tracing::debug!(?config, "resolved configuration");

    let dashboard = Dashboard::connect(&config).await?;
    dashboard.bootstrap_indexes().await;

    let state = Arc::new(AppState::new(dashboard));
    state::spawn_session_sweeper(Arc::clone(&state));
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
