//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for helpdesk-export using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// helpdesk-export - batch export and import for help-desk data
#[derive(Parser, Debug)]
#[command(name = "helpdesk-export")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "helpdesk-export.toml",
        env = "HELPDESK_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HELPDESK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the batch step API over HTTP
    Serve(commands::serve::ServeArgs),

    /// Run one batch job to completion without the HTTP server
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
