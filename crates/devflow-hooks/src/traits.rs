//! Simplified traits for writing hooks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HookResult;
use crate::hooks::chain::{HookHandler, Next};
use crate::hooks::context::HookContext;

/// Hook with separate before/after steps around the rest of the chain.
///
/// Implement this instead of the raw [`HookHandler`] when the handler
/// always continues the chain.
#[async_trait]
pub trait SimpleHookHandler: Send + Sync {
    /// Runs before the remaining handlers.
    async fn before(&self, ctx: &mut HookContext) -> HookResult<()>;

    /// Runs after the remaining handlers completed.
    async fn after(&self, _ctx: &mut HookContext) -> HookResult<()> {
        Ok(())
    }
}

/// Adapts a [`SimpleHookHandler`] to the [`HookHandler`] trait.
pub struct SimpleHandlerAdapter {
    inner: Arc<dyn SimpleHookHandler>,
}

impl SimpleHandlerAdapter {
    /// Creates a new adapter wrapping a simple handler.
    pub fn new(handler: Arc<dyn SimpleHookHandler>) -> Self {
        Self { inner: handler }
    }

    /// Wraps a simple handler into an `Arc<dyn HookHandler>`.
    pub fn wrap(handler: Arc<dyn SimpleHookHandler>) -> Arc<dyn HookHandler> {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl HookHandler for SimpleHandlerAdapter {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        // A failing `before` propagates with the continuation unused, so a
        // surrounding FailOpen resumes the chain.
        self.inner.before(ctx).await?;
        next.run(ctx).await;
        self.inner.after(ctx).await
    }
}

/// A closure-based handler: runs the closure, then the rest of the chain.
pub struct ClosureHandler {
    handler: Box<dyn Fn(&mut HookContext) -> HookResult<()> + Send + Sync>,
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut HookContext) -> HookResult<()> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("handler", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        (self.handler)(ctx)?;
        next.run(ctx).await;
        Ok(())
    }
}
