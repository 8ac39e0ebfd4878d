//! Hook manager: priority-ordered registrations per hook type and the
//! onion dispatcher that runs them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::chain::{HookHandler, Registration, run_chain};
use super::context::HookContext;
use super::definitions::HookType;
use super::fail_open::FailOpen;
use crate::error::{HookError, HookResult};

/// Priority used when a registration does not specify one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Name and priority of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Name, unique per hook type.
    pub name: String,
    /// Priority (lower = earlier execution).
    pub priority: i32,
}

impl RegisterOptions {
    /// Options with the default priority.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Owns the ordered registration list of every hook type.
#[derive(Default)]
pub struct HookManager {
    /// Hook type → registrations sorted by priority (stable on ties).
    registrations: RwLock<HashMap<HookType, Vec<Registration>>>,
}

impl HookManager {
    /// Creates a manager with no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a hook type.
    ///
    /// Fails with [`HookError::DuplicateName`] if the name is already
    /// registered for that type.
    pub async fn register(
        &self,
        hook: HookType,
        handler: Arc<dyn HookHandler>,
        options: RegisterOptions,
    ) -> HookResult<()> {
        let mut registrations = self.registrations.write().await;
        let entries = registrations.entry(hook).or_default();

        if entries.iter().any(|e| e.name == options.name) {
            warn!(hook = %hook, hook_name = %options.name, "Duplicate hook registration rejected");
            return Err(HookError::DuplicateName {
                hook,
                name: options.name,
            });
        }

        entries.push(Registration {
            hook,
            name: options.name.clone(),
            priority: options.priority,
            handler,
        });

        // `sort_by_key` is stable, so equal priorities keep registration order.
        entries.sort_by_key(|e| e.priority);

        info!(
            hook = %hook,
            hook_name = %options.name,
            priority = options.priority,
            "Hook handler registered"
        );

        Ok(())
    }

    /// Registers a handler wrapped in [`FailOpen`] under the same name.
    pub async fn register_guarded(
        &self,
        hook: HookType,
        handler: Arc<dyn HookHandler>,
        options: RegisterOptions,
    ) -> HookResult<()> {
        let guarded = FailOpen::wrap(options.name.clone(), handler);
        self.register(hook, guarded, options).await
    }

    /// Runs every handler registered for `hook` as an onion chain and
    /// returns the (possibly enriched) context.
    ///
    /// Never fails: handler errors are contained at the handler boundary.
    pub async fn dispatch(&self, hook: HookType, mut ctx: HookContext) -> HookContext {
        if ctx.hook != hook {
            debug!(
                hook = %hook,
                context_hook = %ctx.hook,
                "Context hook type differs from dispatched type, overriding"
            );
            ctx.hook = hook;
        }

        // Snapshot so no lock is held while handlers run.
        let chain: Vec<Registration> = {
            let registrations = self.registrations.read().await;
            registrations.get(&hook).cloned().unwrap_or_default()
        };

        if chain.is_empty() {
            debug!(hook = %hook, "No handlers registered");
            return ctx;
        }

        debug!(
            hook = %hook,
            dispatch_id = %ctx.dispatch_id,
            handler_count = chain.len(),
            "Dispatching hook"
        );

        run_chain(&chain, &mut ctx).await;

        debug!(hook = %hook, dispatch_id = %ctx.dispatch_id, "Dispatch complete");
        ctx
    }

    /// Creates a fresh context for `hook` seeded from a JSON object and
    /// dispatches it.
    pub async fn dispatch_value(&self, hook: HookType, data: serde_json::Value) -> HookContext {
        self.dispatch(hook, HookContext::from_value(hook, data)).await
    }

    /// Returns `(name, priority)` of every registration for `hook`, in
    /// execution order.
    pub async fn registrations(&self, hook: HookType) -> Vec<(String, i32)> {
        let registrations = self.registrations.read().await;
        registrations
            .get(&hook)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| (e.name.clone(), e.priority))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of handlers registered for a hook type.
    pub async fn handler_count(&self, hook: HookType) -> usize {
        let registrations = self.registrations.read().await;
        registrations.get(&hook).map(Vec::len).unwrap_or(0)
    }

    /// Returns every hook type with at least one registration.
    pub async fn registered_hooks(&self) -> Vec<HookType> {
        let registrations = self.registrations.read().await;
        let mut hooks: Vec<HookType> = registrations
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(hook, _)| *hook)
            .collect();
        hooks.sort();
        hooks
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager").finish_non_exhaustive()
    }
}
