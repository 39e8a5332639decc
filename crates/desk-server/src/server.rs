use std::sync::Arc;

use desk_core::Desk;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Desk HTTP server.
pub struct DeskServer {
    config: ServerConfig,
    desk: Arc<Desk>,
}

impl DeskServer {
    pub fn new(config: ServerConfig, desk: Arc<Desk>) -> Self {
        Self { config, desk }
    }

    /// Open the configured data file and build a server over it.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let desk = Desk::open(&config.data_file)?;
        Ok(Self::new(config, Arc::new(desk)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.desk.clone(), self.config.cors)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            data = %self.config.data_file.display(),
            "desk server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
