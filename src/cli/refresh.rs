//! Refresh command implementation

use super::{open_registry, quote_client};
use crate::config::Config;
use crate::hub::BroadcastHub;
use crate::scheduler::RefreshScheduler;
use clap::Args;

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RefreshArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let registry = open_registry(config).await?;
        // No subscribers outside `serve`; events are simply dropped
        let hub = BroadcastHub::from_config(&config.hub);
        let scheduler = RefreshScheduler::new(registry, quote_client(config), hub)
            .with_config(&config.refresh);

        let report = scheduler.refresh_once().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("Refreshed {} symbols", report.attempted);
            println!("  Updated: {}", report.updated);
            println!("  Failed:  {}", report.failed);
            println!("  Skipped: {}", report.skipped);
        }
        Ok(())
    }
}
