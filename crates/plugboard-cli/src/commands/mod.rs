//! CLI command definitions and dispatch.

pub mod samples;
pub mod validate;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use plugboard_core::PluginResult;
use plugboard_core::config::PlugboardConfig;

/// Plugboard: validate and inspect in-process plugins
#[derive(Debug, Parser)]
#[command(name = "plugboard", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate plugin manifest files
    Validate(validate::ValidateArgs),
    /// Register the sample plugins and show the wiring
    Samples,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> PluginResult<()> {
        let config = load_config(&self.config)?;
        match &self.command {
            Commands::Validate(args) => validate::execute(args, &config, self.format),
            Commands::Samples => samples::execute(&config, self.format),
        }
    }
}

/// Helper: load configuration from file, with `PLUGBOARD__*` overrides
pub fn load_config(config_path: &str) -> PluginResult<PlugboardConfig> {
    PlugboardConfig::load_from(&[config_path.to_string()])
}
