//! Config backup CLI commands.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info, warn};

use crate::output::{self, OutputFormat};
use devflow_core::config::DevflowConfig;
use devflow_core::error::AppError;
use devflow_hooks::builtin::{BackupEntry, BackupKind, ConfigBackupHook, RestoreReport};

/// Arguments for backup commands
#[derive(Debug, Args)]
pub struct BackupsArgs {
    /// Backup subcommand
    #[command(subcommand)]
    pub command: BackupsCommand,
}

/// Backup subcommands
#[derive(Debug, Subcommand)]
pub enum BackupsCommand {
    /// List backups of a config file, newest first
    List {
        /// The config file whose backups to list
        config_file: PathBuf,
        /// Include pre-restore snapshots
        #[arg(long)]
        all: bool,
    },
    /// Restore a config file from one of its backups
    Restore {
        /// The config file to overwrite
        config_file: PathBuf,
        /// The backup to restore from
        backup: PathBuf,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct BackupRow {
    kind: &'static str,
    created: String,
    path: String,
}

impl From<&BackupEntry> for BackupRow {
    fn from(entry: &BackupEntry) -> Self {
        Self {
            kind: match entry.kind {
                BackupKind::Regular => "backup",
                BackupKind::PreRestore => "pre-restore",
            },
            created: DateTime::from_timestamp_millis(entry.timestamp_ms)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| entry.timestamp_ms.to_string()),
            path: entry.path.display().to_string(),
        }
    }
}

/// Execute backup commands
pub async fn execute(
    args: &BackupsArgs,
    config: &DevflowConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let hook = ConfigBackupHook::new(&config.hooks.backup);

    match &args.command {
        BackupsCommand::List { config_file, all } => {
            let mut entries = hook.list_backups(config_file).await?;
            if *all {
                entries.extend(hook.list_pre_restore_backups(config_file).await?);
            }
            debug!(file = %config_file.display(), count = entries.len(), "Listed backups");
            let rows: Vec<BackupRow> = entries.iter().map(BackupRow::from).collect();
            output::print_list(&rows, format);
        }
        BackupsCommand::Restore {
            config_file,
            backup,
        } => {
            let report = restore_backup(&hook, config_file, backup).await?;
            match format {
                OutputFormat::Table => {
                    output::print_success(&format!(
                        "Restored '{}' from '{}'",
                        config_file.display(),
                        report.restored_from.display()
                    ));
                    if let Some(ref snapshot) = report.pre_restore_backup {
                        output::print_kv("previous content", &snapshot.display().to_string());
                    }
                }
                OutputFormat::Json => output::print_record(&report, format),
            }
        }
    }

    Ok(())
}

async fn restore_backup(
    hook: &ConfigBackupHook,
    config_file: &Path,
    backup: &Path,
) -> Result<RestoreReport, AppError> {
    debug!(
        file = %config_file.display(),
        backup = %backup.display(),
        "Restoring config file"
    );

    match hook.restore(config_file, backup).await {
        Ok(report) => {
            info!(
                file = %config_file.display(),
                snapshot = report.pre_restore_backup.is_some(),
                "Restore finished"
            );
            Ok(report)
        }
        Err(e) => {
            warn!(file = %config_file.display(), error = %e, "Restore failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_core::config::hooks::BackupConfig;
    use devflow_core::error::ErrorKind;

    #[tokio::test]
    async fn test_restore_backup_overwrites_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("settings.json");
        let backup = dir.path().join("saved.json");
        std::fs::write(&config_file, "{\"v\":2}").unwrap();
        std::fs::write(&backup, "{\"v\":1}").unwrap();
        let hook = ConfigBackupHook::new(&BackupConfig::default());

        let report = restore_backup(&hook, &config_file, &backup).await.unwrap();

        assert_eq!(report.restored_from, backup);
        assert_eq!(std::fs::read_to_string(&config_file).unwrap(), "{\"v\":1}");
        let snapshot = report.pre_restore_backup.unwrap();
        assert_eq!(std::fs::read_to_string(snapshot).unwrap(), "{\"v\":2}");
    }

    #[tokio::test]
    async fn test_restore_backup_missing_backup_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let hook = ConfigBackupHook::new(&BackupConfig::default());

        let err = restore_backup(
            &hook,
            &dir.path().join("settings.json"),
            &dir.path().join("missing.json"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
