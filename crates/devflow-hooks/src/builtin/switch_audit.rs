//! Project switch audit trail (`PRE_PROJECT_SWITCH` / `POST_PROJECT_SWITCH`).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::error::HookResult;
use crate::hooks::chain::HookHandler;
use crate::hooks::context::HookContext;
use crate::hooks::definitions::HookType;
use crate::traits::{SimpleHandlerAdapter, SimpleHookHandler};

/// Context key naming the project being switched to.
pub const PROJECT_KEY: &str = "project";

/// Stamps switch events into the context and logs them.
#[derive(Debug, Default)]
pub struct SwitchAuditHook;

impl SwitchAuditHook {
    /// Creates the hook.
    pub fn new() -> Self {
        Self
    }

    /// Adapts the hook for registration.
    pub fn handler(self: Arc<Self>) -> Arc<dyn HookHandler> {
        SimpleHandlerAdapter::wrap(self)
    }

    fn stamp_key(hook: HookType) -> &'static str {
        match hook {
            HookType::PreProjectSwitch => "switch_started_at",
            HookType::PostProjectSwitch => "switch_completed_at",
            _ => "switch_observed_at",
        }
    }
}

#[async_trait]
impl SimpleHookHandler for SwitchAuditHook {
    async fn before(&self, ctx: &mut HookContext) -> HookResult<()> {
        ctx.set(Self::stamp_key(ctx.hook), json!(Utc::now().to_rfc3339()));
        Ok(())
    }

    async fn after(&self, ctx: &mut HookContext) -> HookResult<()> {
        info!(
            hook = %ctx.hook,
            project = ctx.get_str(PROJECT_KEY).unwrap_or("<unknown>"),
            dispatch_id = %ctx.dispatch_id,
            "Project switch event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::manager::{HookManager, RegisterOptions};

    #[tokio::test]
    async fn test_stamps_phase_key() {
        let manager = HookManager::new();
        let audit = Arc::new(SwitchAuditHook::new());
        for hook in [HookType::PreProjectSwitch, HookType::PostProjectSwitch] {
            manager
                .register(hook, audit.clone().handler(), RegisterOptions::new("switch-audit"))
                .await
                .unwrap();
        }

        let pre = manager
            .dispatch(
                HookType::PreProjectSwitch,
                HookContext::new(HookType::PreProjectSwitch).with_string(PROJECT_KEY, "api"),
            )
            .await;
        assert!(pre.get_str("switch_started_at").is_some());
        assert!(!pre.contains("switch_completed_at"));

        let post = manager
            .dispatch(
                HookType::PostProjectSwitch,
                HookContext::new(HookType::PostProjectSwitch),
            )
            .await;
        assert!(post.get_str("switch_completed_at").is_some());
    }
}
