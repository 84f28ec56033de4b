//! Serve command implementation

use super::{open_registry, quote_client};
use crate::api::{self, AppState};
use crate::config::Config;
use crate::hub::BroadcastHub;
use crate::scheduler::RefreshScheduler;
use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind, overriding the config file
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Do not start the background refresh loop
    #[arg(long)]
    pub no_refresh: bool,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let registry = open_registry(config).await?;
        let client = quote_client(config);
        let hub = BroadcastHub::from_config(&config.hub);

        let scheduler = Arc::new(
            RefreshScheduler::new(registry.clone(), client.clone(), hub.clone())
                .with_config(&config.refresh),
        );

        let scheduler_handle = if config.refresh.enabled && !self.no_refresh {
            Some(Arc::clone(&scheduler).spawn())
        } else {
            tracing::info!("Background refresh disabled");
            None
        };

        let app = api::router(AppState {
            registry,
            client,
            scheduler,
            hub,
        });

        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        let listener = TcpListener::bind(bind)
            .await
            .with_context(|| format!("Failed to bind {}", bind))?;
        tracing::info!(addr = %listener.local_addr()?, "API server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("API server failed")?;

        if let Some(handle) = scheduler_handle {
            handle.shutdown().await;
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
