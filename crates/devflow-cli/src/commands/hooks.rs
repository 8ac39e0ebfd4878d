//! Hook registration CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use devflow_core::config::DevflowConfig;
use devflow_core::error::AppError;
use devflow_hooks::{BuiltinDeps, HookManager, HookType, register_builtin_hooks};

/// Arguments for hook commands
#[derive(Debug, Args)]
pub struct HooksArgs {
    /// Hook subcommand
    #[command(subcommand)]
    pub command: HooksCommand,
}

/// Hook subcommands
#[derive(Debug, Subcommand)]
pub enum HooksCommand {
    /// List built-in registrations in execution order
    List {
        /// Only this hook type
        #[arg(long)]
        hook: Option<HookType>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct RegistrationRow {
    hook: HookType,
    name: String,
    priority: i32,
}

/// Execute hook commands
pub async fn execute(
    args: &HooksArgs,
    config: &DevflowConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        HooksCommand::List { hook } => {
            let manager = HookManager::new();
            register_builtin_hooks(&manager, &config.hooks, BuiltinDeps::from_config(config))
                .await?;

            let hooks: Vec<HookType> = match hook {
                Some(h) => vec![*h],
                None => HookType::ALL.to_vec(),
            };

            let mut rows = Vec::new();
            for hook in hooks {
                for (name, priority) in manager.registrations(hook).await {
                    rows.push(RegistrationRow {
                        hook,
                        name,
                        priority,
                    });
                }
            }
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
