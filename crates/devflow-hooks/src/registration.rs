//! Startup wiring of the built-in hooks.
//!
//! Every built-in is wrapped in [`FailOpen`] and registered at a fixed
//! priority. The returned [`BuiltinHooks`] keeps a handle to each hook so
//! the host can reach its state (clear the project cache, list backups).

use std::sync::Arc;

use tracing::info;

use devflow_core::config::DevflowConfig;
use devflow_core::config::hooks::HooksConfig;

use crate::builtin::{
    ConfigBackupHook, CriticalReviewHook, ProjectResolverHook, SuggestionHook, SwitchAuditHook,
};
use crate::collaborators::{
    CommandEvaluator, Evaluator, JsonProjectRegistry, MarkerFileSwitcher, ProjectRegistry,
    ProjectSwitcher,
};
use crate::error::HookResult;
use crate::hooks::chain::HookHandler;
use crate::hooks::definitions::HookType;
use crate::hooks::fail_open::FailOpen;
use crate::hooks::manager::{HookManager, RegisterOptions};

/// Registration names of the built-ins.
pub mod names {
    /// Backup-before-mutate.
    pub const CONFIG_BACKUP: &str = "config-backup";
    /// Directory-to-project resolution.
    pub const PROJECT_RESOLVER: &str = "project-resolver";
    /// Scored suggestions.
    pub const SUGGESTIONS: &str = "suggestions";
    /// Change-triggered critical review.
    pub const CRITICAL_REVIEW: &str = "critical-review";
    /// Project switch audit.
    pub const SWITCH_AUDIT: &str = "switch-audit";
}

/// Fixed priorities of the built-ins.
pub mod priorities {
    /// `config-backup` on `PRE_CONFIG_MODIFICATION`.
    pub const CONFIG_BACKUP: i32 = 10;
    /// `project-resolver` on `USER_PROMPT_SUBMIT`.
    pub const PROJECT_RESOLVER: i32 = 10;
    /// `suggestions` on `USER_PROMPT_SUBMIT`.
    pub const SUGGESTIONS: i32 = 20;
    /// `critical-review` on `USER_PROMPT_SUBMIT`.
    pub const CRITICAL_REVIEW_ON_PROMPT: i32 = 30;
    /// `critical-review` on `POST_TOOL_USE`.
    pub const CRITICAL_REVIEW_ON_TOOL: i32 = 10;
    /// `switch-audit` on both project switch types.
    pub const SWITCH_AUDIT: i32 = 10;
}

/// External collaborators the built-ins depend on.
#[derive(Clone)]
pub struct BuiltinDeps {
    /// Project registry reader.
    pub registry: Arc<dyn ProjectRegistry>,
    /// Current-project marker and switch operation.
    pub switcher: Arc<dyn ProjectSwitcher>,
    /// Out-of-process evaluation.
    pub evaluator: Arc<dyn Evaluator>,
}

impl BuiltinDeps {
    /// File- and process-backed collaborators at the configured paths.
    pub fn from_config(config: &DevflowConfig) -> Self {
        Self {
            registry: Arc::new(JsonProjectRegistry::new(config.paths.registry_path())),
            switcher: Arc::new(MarkerFileSwitcher::new(config.paths.current_project_path())),
            evaluator: Arc::new(CommandEvaluator::from_config(&config.hooks.critical_review)),
        }
    }
}

/// Handles to the registered built-ins.
#[derive(Clone)]
pub struct BuiltinHooks {
    /// Backup-before-mutate.
    pub backup: Arc<ConfigBackupHook>,
    /// Directory-to-project resolution.
    pub project_resolver: Arc<ProjectResolverHook>,
    /// Scored suggestions.
    pub suggestions: Arc<SuggestionHook>,
    /// Change-triggered critical review.
    pub critical_review: Arc<CriticalReviewHook>,
    /// Project switch audit.
    pub switch_audit: Arc<SwitchAuditHook>,
}

/// Registers every built-in hook. Call once at startup.
pub async fn register_builtin_hooks(
    manager: &HookManager,
    config: &HooksConfig,
    deps: BuiltinDeps,
) -> HookResult<BuiltinHooks> {
    let hooks = BuiltinHooks {
        backup: Arc::new(ConfigBackupHook::new(&config.backup)),
        project_resolver: Arc::new(ProjectResolverHook::new(
            &config.project_switch,
            deps.registry,
            deps.switcher,
        )),
        suggestions: Arc::new(SuggestionHook::new(&config.suggestions)),
        critical_review: Arc::new(CriticalReviewHook::new(
            &config.critical_review,
            deps.evaluator,
        )),
        switch_audit: Arc::new(SwitchAuditHook::new()),
    };

    let critical_review: Arc<dyn HookHandler> = hooks.critical_review.clone();
    let switch_audit = hooks.switch_audit.clone().handler();

    let plan: Vec<(HookType, &str, i32, Arc<dyn HookHandler>)> = vec![
        (
            HookType::PreConfigModification,
            names::CONFIG_BACKUP,
            priorities::CONFIG_BACKUP,
            hooks.backup.clone(),
        ),
        (
            HookType::UserPromptSubmit,
            names::PROJECT_RESOLVER,
            priorities::PROJECT_RESOLVER,
            hooks.project_resolver.clone(),
        ),
        (
            HookType::UserPromptSubmit,
            names::SUGGESTIONS,
            priorities::SUGGESTIONS,
            hooks.suggestions.clone(),
        ),
        (
            HookType::UserPromptSubmit,
            names::CRITICAL_REVIEW,
            priorities::CRITICAL_REVIEW_ON_PROMPT,
            critical_review.clone(),
        ),
        (
            HookType::PostToolUse,
            names::CRITICAL_REVIEW,
            priorities::CRITICAL_REVIEW_ON_TOOL,
            critical_review,
        ),
        (
            HookType::PreProjectSwitch,
            names::SWITCH_AUDIT,
            priorities::SWITCH_AUDIT,
            switch_audit.clone(),
        ),
        (
            HookType::PostProjectSwitch,
            names::SWITCH_AUDIT,
            priorities::SWITCH_AUDIT,
            switch_audit,
        ),
    ];

    let count = plan.len();
    for (hook, name, priority, handler) in plan {
        manager
            .register(
                hook,
                FailOpen::wrap(name, handler),
                RegisterOptions::new(name).priority(priority),
            )
            .await?;
    }

    info!(registrations = count, "Built-in hooks registered");
    Ok(hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;

    #[tokio::test]
    async fn test_builtins_registered_at_fixed_priorities() {
        let manager = HookManager::new();
        let config = DevflowConfig::default();
        register_builtin_hooks(&manager, &config.hooks, BuiltinDeps::from_config(&config))
            .await
            .unwrap();

        assert_eq!(
            manager.registrations(HookType::UserPromptSubmit).await,
            vec![
                ("project-resolver".to_string(), 10),
                ("suggestions".to_string(), 20),
                ("critical-review".to_string(), 30),
            ]
        );
        assert_eq!(
            manager.registrations(HookType::PostToolUse).await,
            vec![("critical-review".to_string(), 10)]
        );
        for hook in HookType::ALL {
            assert!(manager.handler_count(hook).await >= 1, "{hook} has no handler");
        }
    }

    #[tokio::test]
    async fn test_registering_twice_is_rejected() {
        let manager = HookManager::new();
        let config = DevflowConfig::default();
        let deps = BuiltinDeps::from_config(&config);

        register_builtin_hooks(&manager, &config.hooks, deps.clone())
            .await
            .unwrap();
        let err = register_builtin_hooks(&manager, &config.hooks, deps)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, HookError::DuplicateName { .. }));
    }
}
