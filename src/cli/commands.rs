// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HashVault stats bot - posts pool statistics to a Discord channel
#[derive(Parser, Debug)]
#[command(name = "hashvault-bot")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (run the bot or generate a config file)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Run the bot until interrupted
    Start(StartOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the bot
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Optional TOML configuration file; environment variables win over it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds between updates (overrides config)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Post failures to the channel as well as logging them
    #[arg(long)]
    pub report_errors: bool,

    /// Don't serve the liveness endpoint
    #[arg(long)]
    pub no_health: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "bot.toml")]
    pub output: PathBuf,
}
