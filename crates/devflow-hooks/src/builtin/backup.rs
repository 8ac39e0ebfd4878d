//! Backup-before-mutate hook (`PRE_CONFIG_MODIFICATION`).
//!
//! Before a config file is written, the current file is copied to
//! `<dir>/backups/<name>.backup.<unix_ms>`. Only the newest `max_backups`
//! backups of each file are kept. Restoring first snapshots the live
//! file as `<name>.pre-restore.backup.<unix_ms>`, so a restore can itself
//! be undone.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use devflow_core::config::hooks::BackupConfig;

use super::resolve_context_path;
use crate::error::{HookError, HookResult};
use crate::hooks::chain::{HookHandler, Next};
use crate::hooks::context::HookContext;

/// Context key holding the config file about to be modified.
pub const CONFIG_FILE_KEY: &str = "config_file";
/// Context key the created backup path is written to.
pub const BACKUP_PATH_KEY: &str = "backup_path";

/// Kind of backup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupKind {
    /// Taken before a config modification.
    Regular,
    /// Taken before a restore overwrote the live file.
    PreRestore,
}

impl BackupKind {
    fn infix(&self) -> &'static str {
        match self {
            Self::Regular => "backup",
            Self::PreRestore => "pre-restore.backup",
        }
    }

    fn prefix(&self, file_name: &str) -> String {
        format!("{file_name}.{}.", self.infix())
    }
}

/// A backup found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupEntry {
    /// Full path of the backup file.
    pub path: PathBuf,
    /// Millisecond timestamp encoded in the file name.
    pub timestamp_ms: i64,
    /// Regular or pre-restore backup.
    pub kind: BackupKind,
}

/// Outcome of a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// The backup that was copied over the live file.
    pub restored_from: PathBuf,
    /// Snapshot of the live file taken before overwriting it.
    pub pre_restore_backup: Option<PathBuf>,
}

/// Creates, rotates and restores config file backups.
#[derive(Debug, Clone)]
pub struct ConfigBackupHook {
    enabled: bool,
    max_backups: usize,
    backup_dir_name: String,
}

impl ConfigBackupHook {
    /// Creates the hook from its configuration section.
    pub fn new(config: &BackupConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_backups: config.max_backups.max(1),
            backup_dir_name: config.backup_dir_name.clone(),
        }
    }

    /// Number of backups retained per file and kind.
    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// Directory holding the backups of `config_file`.
    pub fn backup_dir(&self, config_file: &Path) -> PathBuf {
        config_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.backup_dir_name)
    }

    /// Copies `config_file` into the backups directory and rotates old
    /// backups. Returns `None` when the config file does not exist yet.
    pub async fn backup(&self, config_file: &Path) -> HookResult<Option<PathBuf>> {
        if !path_exists(config_file).await? {
            debug!(file = %config_file.display(), "Config file absent, nothing to back up");
            return Ok(None);
        }

        let path = self.snapshot(config_file, BackupKind::Regular).await?;
        self.rotate(config_file, BackupKind::Regular).await?;

        info!(
            file = %config_file.display(),
            backup = %path.display(),
            "Config backup created"
        );
        Ok(Some(path))
    }

    /// Lists regular backups of `config_file`, newest first.
    pub async fn list_backups(&self, config_file: &Path) -> HookResult<Vec<BackupEntry>> {
        self.list(config_file, BackupKind::Regular).await
    }

    /// Lists pre-restore snapshots of `config_file`, newest first.
    pub async fn list_pre_restore_backups(
        &self,
        config_file: &Path,
    ) -> HookResult<Vec<BackupEntry>> {
        self.list(config_file, BackupKind::PreRestore).await
    }

    /// Copies `backup` over `config_file`, snapshotting the live file first.
    pub async fn restore(&self, config_file: &Path, backup: &Path) -> HookResult<RestoreReport> {
        if !path_exists(backup).await? {
            return Err(HookError::BackupNotFound {
                path: backup.to_path_buf(),
            });
        }

        let pre_restore_backup = if path_exists(config_file).await? {
            let snapshot = self.snapshot(config_file, BackupKind::PreRestore).await?;
            self.rotate(config_file, BackupKind::PreRestore).await?;
            Some(snapshot)
        } else {
            None
        };

        if let Some(parent) = config_file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                HookError::io(format!("Failed to create '{}'", parent.display()), e)
            })?;
        }

        tokio::fs::copy(backup, config_file).await.map_err(|e| {
            HookError::io(
                format!(
                    "Failed to restore '{}' from '{}'",
                    config_file.display(),
                    backup.display()
                ),
                e,
            )
        })?;

        info!(
            file = %config_file.display(),
            backup = %backup.display(),
            "Config restored from backup"
        );

        Ok(RestoreReport {
            restored_from: backup.to_path_buf(),
            pre_restore_backup,
        })
    }

    async fn snapshot(&self, config_file: &Path, kind: BackupKind) -> HookResult<PathBuf> {
        let dir = self.backup_dir(config_file);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| HookError::io(format!("Failed to create '{}'", dir.display()), e))?;

        let file_name = file_name_of(config_file)?;

        // Timestamps must be strictly increasing per file even when several
        // backups land in the same millisecond.
        let newest = self
            .list(config_file, kind)
            .await?
            .first()
            .map(|e| e.timestamp_ms);
        let now = Utc::now().timestamp_millis();
        let timestamp_ms = match newest {
            Some(ts) if ts >= now => ts + 1,
            _ => now,
        };

        let target = dir.join(format!("{}{timestamp_ms}", kind.prefix(&file_name)));
        tokio::fs::copy(config_file, &target).await.map_err(|e| {
            HookError::io(
                format!(
                    "Failed to copy '{}' to '{}'",
                    config_file.display(),
                    target.display()
                ),
                e,
            )
        })?;

        Ok(target)
    }

    async fn rotate(&self, config_file: &Path, kind: BackupKind) -> HookResult<usize> {
        let entries = self.list(config_file, kind).await?;
        let mut removed = 0;

        for entry in entries.iter().skip(self.max_backups) {
            tokio::fs::remove_file(&entry.path).await.map_err(|e| {
                HookError::io(format!("Failed to remove '{}'", entry.path.display()), e)
            })?;
            removed += 1;
        }

        if removed > 0 {
            debug!(
                file = %config_file.display(),
                removed,
                kept = self.max_backups,
                "Old backups rotated out"
            );
        }
        Ok(removed)
    }

    async fn list(&self, config_file: &Path, kind: BackupKind) -> HookResult<Vec<BackupEntry>> {
        let dir = self.backup_dir(config_file);
        let prefix = kind.prefix(&file_name_of(config_file)?);

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(HookError::io(
                    format!("Failed to list '{}'", dir.display()),
                    e,
                ));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| HookError::io(format!("Failed to list '{}'", dir.display()), e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(timestamp_ms) = name
                .strip_prefix(&prefix)
                .and_then(|ts| ts.parse::<i64>().ok())
            else {
                continue;
            };
            entries.push(BackupEntry {
                path: entry.path(),
                timestamp_ms,
                kind,
            });
        }

        entries.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        Ok(entries)
    }
}

#[async_trait]
impl HookHandler for ConfigBackupHook {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        if self.enabled {
            let config_file = resolve_context_path(ctx, CONFIG_FILE_KEY).ok_or_else(|| {
                HookError::Configuration(format!("'{CONFIG_FILE_KEY}' missing from context"))
            })?;

            if let Some(backup) = self.backup(&config_file).await? {
                ctx.set(BACKUP_PATH_KEY, json!(backup.to_string_lossy()));
            }
        }

        next.run(ctx).await;
        Ok(())
    }
}

fn file_name_of(path: &Path) -> HookResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            HookError::Configuration(format!("'{}' has no usable file name", path.display()))
        })
}

async fn path_exists(path: &Path) -> HookResult<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| HookError::io(format!("Failed to stat '{}'", path.display()), e))
}
