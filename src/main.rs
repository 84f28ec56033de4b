use clap::Parser;
use stock_pulse::cli::{Cli, Commands};
use stock_pulse::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::example()?
        }
    };

    // Initialize telemetry
    stock_pulse::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting stock-pulse service");
            args.execute(&config).await?;
        }
        Commands::Quote(args) => args.execute(&config).await?,
        Commands::Refresh(args) => args.execute(&config).await?,
        Commands::List(args) => args.execute(&config).await?,
        Commands::Config => {
            println!("Current configuration:");
            println!("  Server: {}", config.server.bind);
            println!("  Database: {}", config.storage.database_url);
            println!("  Quote provider: {}", config.quote.base_url);
            println!(
                "  Refresh: enabled={}, every {}s, fetch timeout {}s, concurrency {}",
                config.refresh.enabled,
                config.refresh.interval_secs,
                config.refresh.fetch_timeout_secs,
                config.refresh.max_concurrent_fetches
            );
            println!(
                "  Hub: {} events per subscriber",
                config.hub.subscriber_capacity
            );
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
