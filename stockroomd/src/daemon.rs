//! Daemon: Main runtime orchestrator.
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Open the store (PostgreSQL pool, or in-memory)
//! 3. Start API server
//! 4. Graceful shutdown on SIGINT

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use stockroom_store::{MemoryStore, Store};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::fulfillment::FulfillmentService;

// =============================================================================
// Daemon
// =============================================================================

/// The main Stockroom daemon.
pub struct Daemon {
    /// Configuration
    config: Config,
    /// Store
    store: Arc<dyn Store>,
}

impl Daemon {
    /// Create a new daemon over the provided store.
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    /// Create a new daemon on an empty in-memory store (for testing/development).
    pub fn new_in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Create a daemon with the store the configuration asks for.
    pub async fn from_config(config: Config) -> DaemonResult<Self> {
        match config.database.url.clone() {
            Some(url) => Self::with_database(config, &url).await,
            None => {
                warn!("DATABASE_URL not set, using in-memory store (data is lost on exit)");
                Ok(Self::new_in_memory(config))
            },
        }
    }

    #[cfg(feature = "postgres")]
    async fn with_database(config: Config, url: &str) -> DaemonResult<Self> {
        use sqlx::postgres::PgPoolOptions;
        use stockroom_store::PgStore;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.acquire_timeout)
            .connect(url)
            .await
            .map_err(stockroom_store::StoreError::from)?;

        info!(
            max_connections = config.database.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::new(config, Arc::new(PgStore::new(pool))))
    }

    #[cfg(not(feature = "postgres"))]
    async fn with_database(config: Config, _url: &str) -> DaemonResult<Self> {
        if config.environment == crate::config::Environment::Production {
            return Err(DaemonError::Config(
                "DATABASE_URL is set but stockroomd was built without the postgres feature"
                    .to_string(),
            ));
        }

        warn!("Built without the postgres feature, ignoring DATABASE_URL");
        Ok(Self::new_in_memory(config))
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        self.serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
        })
        .await
    }

    /// Serve the API on `listener` until `shutdown` completes.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> DaemonResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = self.local_addr(&listener)?;

        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            %local_addr,
            "Starting Stockroom daemon"
        );

        let router = create_router(Arc::new(ApiState {
            fulfillment: FulfillmentService::new(self.store.clone()),
        }));

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| DaemonError::Config(format!("API server error: {}", e)))?;

        info!("Shutdown complete");
        Ok(())
    }

    fn local_addr(&self, listener: &TcpListener) -> DaemonResult<SocketAddr> {
        listener
            .local_addr()
            .map_err(|e| DaemonError::Config(format!("Failed to get local address: {}", e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
