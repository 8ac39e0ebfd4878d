//! Devflow hook runner.
//!
//! Invoked by the coding assistant at each lifecycle point. Reads the
//! event payload (a JSON object) from stdin, dispatches it through the
//! built-in hooks and prints the enriched context as JSON on stdout.
//! Logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{EnvFilter, fmt};

use devflow_core::config::DevflowConfig;
use devflow_core::error::AppError;
use devflow_hooks::{BuiltinDeps, HookContext, HookManager, HookType, register_builtin_hooks};

/// Dispatch one hook event
#[derive(Debug, Parser)]
#[command(name = "devflow-hook", version, about, long_about = None)]
struct Args {
    /// Hook type, e.g. USER_PROMPT_SUBMIT or post-tool-use
    hook: HookType,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match DevflowConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(args.hook, config).await {
        tracing::error!("Hook runner error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging on stderr
fn init_logging(config: &DevflowConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(hook: HookType, config: DevflowConfig) -> Result<(), AppError> {
    let manager = HookManager::new();
    register_builtin_hooks(&manager, &config.hooks, BuiltinDeps::from_config(&config)).await?;

    let payload = read_payload().await?;
    let ctx = manager
        .dispatch(hook, HookContext::from_value(hook, payload))
        .await;

    println!("{}", serde_json::to_string(&ctx)?);
    Ok(())
}

/// Reads stdin as JSON. Empty input is `null`; anything unparseable is
/// passed through as a string.
async fn read_payload() -> Result<Value, AppError> {
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .map_err(|e| AppError::io(format!("Failed to read stdin: {}", e)))?;

    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Hook payload is not JSON, passing it through as text");
        Value::String(raw.trim().to_string())
    }))
}
