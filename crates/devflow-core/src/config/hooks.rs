//! Toggles for the built-in hooks.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for every built-in hook, one section per hook.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Backup-before-mutate settings.
    #[serde(default)]
    #[validate(nested)]
    pub backup: BackupConfig,
    /// Directory-to-project resolution settings.
    #[serde(default)]
    #[validate(nested)]
    pub project_switch: ProjectSwitchConfig,
    /// Scored suggestion settings.
    #[serde(default)]
    #[validate(nested)]
    pub suggestions: SuggestionConfig,
    /// Change-triggered critical review settings.
    #[serde(default)]
    #[validate(nested)]
    pub critical_review: CriticalReviewConfig,
}

/// Backup-before-mutate configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Whether config files are backed up before modification.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of backups retained per config file.
    #[serde(default = "default_max_backups")]
    #[validate(range(min = 1, max = 100))]
    pub max_backups: usize,
    /// Name of the backups directory created next to the config file.
    #[serde(default = "default_backup_dir_name")]
    #[validate(length(min = 1))]
    pub backup_dir_name: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_backups: default_max_backups(),
            backup_dir_name: default_backup_dir_name(),
        }
    }
}

/// Directory-to-project resolution configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct ProjectSwitchConfig {
    /// Fallback for the registry's `autoSwitchOnDirectoryChange` setting.
    #[serde(default = "default_true")]
    pub auto_switch_on_directory_change: bool,
    /// Lifetime of the cached project index in seconds.
    #[serde(default = "default_cache_ttl")]
    #[validate(range(min = 1))]
    pub cache_ttl_seconds: u64,
}

impl Default for ProjectSwitchConfig {
    fn default() -> Self {
        Self {
            auto_switch_on_directory_change: true,
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Scored suggestion configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Whether suggestions are computed on prompt submission.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Candidates scoring below this are dropped.
    #[serde(default = "default_min_match_score")]
    pub min_match_score: u32,
    /// Maximum number of suggestions returned per prompt.
    #[serde(default = "default_max_suggestions")]
    #[validate(range(min = 1))]
    pub max_suggestions: usize,
    /// A candidate is not suggested again within this many minutes.
    #[serde(default = "default_throttle_minutes")]
    pub throttle_minutes: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_match_score: default_min_match_score(),
            max_suggestions: default_max_suggestions(),
            throttle_minutes: default_throttle_minutes(),
        }
    }
}

/// Change-triggered critical review configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct CriticalReviewConfig {
    /// Whether the external evaluation runs at all.
    #[serde(default)]
    pub enable_critical_review: bool,
    /// File watched for changes, relative to the working directory.
    #[serde(default = "default_monitored_file")]
    #[validate(length(min = 1))]
    pub monitored_file: String,
    /// Minimum interval between two evaluation runs.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Evaluation executable.
    #[serde(default = "default_command")]
    #[validate(length(min = 1))]
    pub command: String,
    /// Evaluation arguments; `{file}` is replaced with the monitored path.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Upper bound on a single evaluation run.
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 3600))]
    pub timeout_seconds: u64,
}

impl Default for CriticalReviewConfig {
    fn default() -> Self {
        Self {
            enable_critical_review: false,
            monitored_file: default_monitored_file(),
            throttle_ms: default_throttle_ms(),
            command: default_command(),
            args: default_args(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_backups() -> usize {
    10
}

fn default_backup_dir_name() -> String {
    "backups".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_min_match_score() -> u32 {
    2
}

fn default_max_suggestions() -> usize {
    3
}

fn default_throttle_minutes() -> u64 {
    30
}

fn default_monitored_file() -> String {
    "TODO.md".to_string()
}

fn default_throttle_ms() -> u64 {
    5000
}

fn default_command() -> String {
    "claude".to_string()
}

fn default_args() -> Vec<String> {
    vec!["--print".to_string(), "review {file}".to_string()]
}

fn default_timeout_seconds() -> u64 {
    120
}
