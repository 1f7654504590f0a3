//! washd - laundry room server daemon
//!
//! Tracks which browser session occupies each of the laundry machines and
//! proxies background-removal requests to a generative image model.

pub mod api;
pub mod config;
pub mod gemini;
pub mod images;
pub mod laundry;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use api::AppState;
use laundry::OccupancyStore;

pub use config::Config;

/// The washd server instance
pub struct Server {
    config: Config,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Result<Self> {
        let state = AppState::new(&config)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        if !state.gemini.is_configured() {
            warn!("No Gemini API key configured, background removal will fail");
        }

        Ok(Self {
            config,
            state,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the occupancy store
    pub fn occupancy(&self) -> Arc<OccupancyStore> {
        self.state.occupancy.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("washd listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("washd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
