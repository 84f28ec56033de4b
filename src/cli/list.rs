//! List command implementation

use super::open_registry;
use crate::api::TrackedView;
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let registry = open_registry(config).await?;
        let tracked: Vec<TrackedView> = registry
            .list_all()
            .await?
            .into_iter()
            .map(TrackedView::from)
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&tracked)?);
            return Ok(());
        }

        if tracked.is_empty() {
            println!("No tracked symbols");
            return Ok(());
        }

        println!("{:>4}  {:<10} {:>12} {:>10} {:<4}", "ID", "SYMBOL", "PRICE", "MKT CAP", "CCY");
        for row in &tracked {
            println!(
                "{:>4}  {:<10} {:>12} {:>10} {:<4}",
                row.id,
                row.symbol,
                row.price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".into()),
                row.market_cap.as_deref().unwrap_or("-"),
                row.currency.as_deref().unwrap_or("-"),
            );
        }
        Ok(())
    }
}
