//! Bucketgate - multi-region file gateway

use bucketgate_cli::{run_server, GatewayConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bucketgate")]
#[command(about = "Multi-region file gateway for S3-compatible storage")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "BUCKETGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "BUCKETGATE_PORT")]
    port: u16,

    /// Region settings file (TOML, YAML or JSON); built-in layout when omitted
    #[arg(short, long, env = "BUCKETGATE_REGIONS")]
    regions: Option<PathBuf>,

    /// Directory for staged uploads
    #[arg(long, default_value = "uploads", env = "BUCKETGATE_UPLOAD_DIR")]
    upload_dir: PathBuf,

    /// Maximum request body size in bytes
    #[arg(long, env = "BUCKETGATE_MAX_UPLOAD_SIZE")]
    max_upload_size: Option<usize>,

    /// Requests per second per client IP (0 disables)
    #[arg(long, default_value = "100", env = "BUCKETGATE_RATE_LIMIT")]
    rate_limit: u32,

    /// Disable CORS headers
    #[arg(long, env = "BUCKETGATE_NO_CORS")]
    no_cors: bool,

    /// Use in-memory storage (for testing, data will not persist)
    #[arg(long, env = "BUCKETGATE_MEMORY_STORE")]
    memory_store: bool,

    /// Enable debug logging
    #[arg(short, long, env = "BUCKETGATE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "bucketgate_cli={log_level},bucketgate_core={log_level},tower_http={log_level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bucketgate on {}:{}", args.host, args.port);
    match &args.regions {
        Some(path) => tracing::info!("Region settings: {}", path.display()),
        None => tracing::info!("Region settings: built-in layout"),
    }

    if args.memory_store {
        tracing::warn!("Using in-memory storage - data will NOT persist!");
    }

    let defaults = GatewayConfig::default();
    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        regions_file: args.regions,
        upload_dir: args.upload_dir,
        max_upload_size: args.max_upload_size.unwrap_or(defaults.max_upload_size),
        rate_limit_rps: args.rate_limit,
        cors_enabled: !args.no_cors,
        use_memory_store: args.memory_store,
        ..defaults
    };

    run_server(config).await
}
