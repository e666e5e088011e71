//! Coffee Service entry point.
//!
//! Initializes tracing, loads configuration from TOML, wires the upstream
//! coffee client into shared state, builds the Axum router and starts the
//! HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coffee_service::coffee::HttpCoffeeClient;
use coffee_service::config::{AppConfig, LogFormat, LoggingConfig, DEFAULT_CONFIG_PATH};
use coffee_service::http::start_server;
use coffee_service::metrics::Metrics;
use coffee_service::routes::create_router;
use coffee_service::state::AppState;

/// Coffee Service: health checks and drink recommendations
#[derive(Parser, Debug)]
#[command(name = "coffee-service", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "coffee_service=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Initialize tracing with priority: CLI > env > config
fn init_tracing(cli_filter: Option<String>, logging: &LoggingConfig) {
    let log_filter = cli_filter
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| logging.level.clone());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));

    if logging.format == LogFormat::Json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config is loaded before tracing so the configured format applies
    let config = AppConfig::load(&args.config)?;

    init_tracing(args.log_level, &config.logging);

    tracing::info!(
        version = %config.app_version,
        git_commit = %config.git_commit_sha,
        "Starting application"
    );

    let client = HttpCoffeeClient::from_config(&config.coffee_api)?;
    tracing::info!(
        base_url = %client.base_url(),
        timeout_seconds = config.coffee_api.timeout_seconds,
        "Coffee API configured"
    );

    let http_config = config.http.clone();
    let metrics = Metrics::new(env!("CARGO_PKG_NAME"))?;
    let state = AppState::new(config, Arc::new(client), metrics);
    let app = create_router(state);

    start_server(app, &http_config).await?;

    tracing::warn!("Shutting down application");
    Ok(())
}
