//! Serve command implementation
//!
//! This module implements the `serve` command, which exposes the batch step
//! API over HTTP until a shutdown signal arrives.

use crate::adapters::store::create_stores;
use crate::config::load_config;
use crate::core::export::BatchOrchestrator;
use crate::domain::JobFilters;
use crate::server::{self, AppState};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the bind address (host:port)
    #[arg(long)]
    pub bind: Option<String>,

    /// Start even if the record store cannot be reached
    #[arg(long)]
    pub skip_store_check: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting serve command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let stores = match create_stores(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create record store");
                eprintln!("Failed to initialize record store: {e}");
                return Ok(4);
            }
        };

        let backend = stores.records.backend_name();
        if !self.skip_store_check {
            if let Err(e) = stores.records.count_customers(&JobFilters::default()).await {
                tracing::error!(backend = backend, error = %e, "Record store check failed");
                eprintln!("Record store '{backend}' is not reachable: {e}");
                return Ok(4);
            }
        }

        let orchestrator = BatchOrchestrator::from_config(&config, stores);
        if !orchestrator.artifacts().is_writable().await {
            tracing::warn!(
                dir = %orchestrator.artifacts().dir().display(),
                "Artifact directory is not writable; export steps will fail"
            );
        }

        let address = self
            .bind
            .clone()
            .unwrap_or_else(|| config.server.bind_address());
        let state = Arc::new(AppState::new(orchestrator, backend));

        println!("Serving batch API on http://{address} (store: {backend})");

        match server::serve(&address, state, shutdown_signal).await {
            Ok(()) => {
                tracing::info!("Server stopped");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Server failed");
                eprintln!("Server failed: {e}");
                Ok(5)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let args = ServeArgs {
            bind: None,
            skip_store_check: false,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute("/nonexistent/helpdesk-export.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
