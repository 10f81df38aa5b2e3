use clap::Parser;
use edge_engine::cli::{Cli, Commands};
use edge_engine::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    edge_engine::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Process(args) => {
            tracing::info!("Starting batch processing");
            args.execute(&config).await?;
        }
        Commands::Status => {
            println!("edge-engine status");
            println!("  Mode: Paper Trading");
            println!("  Status: Not running");
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Signal: min_edge={}, min_confidence={}, min_liquidity={}",
                config.signal.min_edge, config.signal.min_confidence, config.signal.min_liquidity
            );
            println!(
                "  Sizing: Kelly={}, MaxPos={}%",
                config.sizing.kelly_fraction,
                config.sizing.max_position_pct * rust_decimal_macros::dec!(100)
            );
            println!(
                "  Risk: max_positions={}, max_exposure={}%, max_daily_loss={}%",
                config.risk.max_open_positions,
                config.risk.max_total_exposure_pct * rust_decimal_macros::dec!(100),
                config.risk.max_daily_loss_pct * rust_decimal_macros::dec!(100)
            );
            println!(
                "  Breaker: max_drawdown={}%, cooldown={}s",
                config.breaker.max_drawdown_pct * rust_decimal_macros::dec!(100),
                config.breaker.cooldown_seconds
            );
            println!("  Bankroll: {}", config.engine.initial_bankroll);
        }
    }

    Ok(())
}
