//! CLI interface for edge-engine
//!
//! Provides subcommands for:
//! - `process`: Run a batch of predictions through the engine
//! - `status`: Show current state
//! - `config`: Show configuration

mod process;

pub use process::ProcessArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "edge-engine")]
#[command(about = "Automated trade decision engine for prediction markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a batch of predictions through the engine
    Process(ProcessArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}
