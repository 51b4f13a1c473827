//! CLI Adapter
//!
//! Command-line interface for the flywheel engine, using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flywheel - Creator-Fee Buyback Engine for Solana
#[derive(Parser, Debug)]
#[command(
    name = "flywheel",
    version = env!("CARGO_PKG_VERSION"),
    about = "Creator-fee buyback engine for Solana",
    long_about = "Flywheel harvests accumulated creator fees on a fixed epoch cadence, \
                  buys back the protocol token, burns a configured share of the buyback, \
                  and deposits the remainder into a liquidity pool."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the epoch scheduler (and webhook ingress when configured)
    Run(RunCmd),

    /// Execute a single epoch immediately, then exit
    Epoch(EpochCmd),

    /// Print operator wallet and gating status
    Status(StatusCmd),
}

/// Start the scheduler loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Force dry-run mode regardless of configuration
    #[arg(long)]
    pub dry_run: bool,
}

/// Manual one-shot epoch execution
#[derive(Parser, Debug)]
pub struct EpochCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Force dry-run mode regardless of configuration
    #[arg(long)]
    pub dry_run: bool,
}

/// Operator status
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}
