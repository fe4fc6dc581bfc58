//! Stockroom Daemon
//!
//! HTTP service for warehouse order fulfillment.
//!
//! # Usage
//!
//! ```bash
//! # Start on the in-memory store
//! cargo run -p stockroomd
//!
//! # Start against PostgreSQL
//! DATABASE_URL=postgres://localhost/stockroom cargo run -p stockroomd --features postgres
//!
//! # Manage the schema
//! cargo run -p stockroomd --features postgres -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOCKROOM_ENV`: Environment (test, development, production)
//! - `STOCKROOM_API_HOST`: API host (default: 0.0.0.0)
//! - `STOCKROOM_API_PORT`: API port (default: 8080)
//! - `DATABASE_URL`: PostgreSQL connection string (required in production)
//! - `STOCKROOM_DB_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `STOCKROOM_DB_ACQUIRE_TIMEOUT_SECS`: Pool acquire timeout (default: 5)
//! - `RUST_LOG`: Log filter (`stockroomd=info` is always added)

use stockroomd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("stockroomd=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("db") {
        return run_db(args).await;
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        database = config.database.url.is_some(),
        "Stockroom Daemon"
    );

    let daemon = Daemon::from_config(config).await?;
    daemon.run().await?;

    Ok(())
}

#[cfg(feature = "postgres")]
async fn run_db(args: Vec<String>) -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    stockroomd::db::run_db_command(args).await
}

#[cfg(not(feature = "postgres"))]
async fn run_db(_args: Vec<String>) -> anyhow::Result<()> {
    anyhow::bail!("db commands need stockroomd built with the postgres feature")
}
