//! CLI command definitions and dispatch.

pub mod backups;
pub mod hooks;
pub mod score;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use devflow_core::config::DevflowConfig;
use devflow_core::error::AppError;

/// Devflow: hook maintenance for coding sessions
#[derive(Debug, Parser)]
#[command(name = "devflow-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to config/devflow.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

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
    /// Config file backups
    Backups(backups::BackupsArgs),
    /// Registered hooks
    Hooks(hooks::HooksArgs),
    /// Score a suggestion candidate from its match flags
    Score(score::ScoreArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(self.config.as_deref())?;
        match &self.command {
            Commands::Backups(args) => backups::execute(args, &config, self.format).await,
            Commands::Hooks(args) => hooks::execute(args, &config, self.format).await,
            Commands::Score(args) => score::execute(args, &config, self.format),
        }
    }
}

/// Helper: load configuration from file and environment
pub fn load_config(path: Option<&std::path::Path>) -> Result<DevflowConfig, AppError> {
    DevflowConfig::load(path)
}
