//! Failure-containment wrapper.
//!
//! [`FailOpen`] decorates any handler so that an error or panic is logged
//! as `"{name}: {reason}"` and swallowed. If the wrapped handler failed
//! before invoking its continuation, the wrapper invokes it instead, so
//! one broken cross-cutting concern never blocks the rest of the chain.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::error;

use super::chain::{HookHandler, Next, panic_message};
use super::context::HookContext;
use crate::error::HookResult;

/// Handler decorator with a fail-open continuation policy.
pub struct FailOpen {
    name: String,
    inner: Arc<dyn HookHandler>,
}

impl FailOpen {
    /// Wraps `inner`; `name` is used in failure log lines.
    pub fn new(name: impl Into<String>, inner: Arc<dyn HookHandler>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    /// Wraps `inner` into an `Arc<dyn HookHandler>` ready for registration.
    pub fn wrap(name: impl Into<String>, inner: Arc<dyn HookHandler>) -> Arc<dyn HookHandler> {
        Arc::new(Self::new(name, inner))
    }

    /// Name used when logging contained failures.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FailOpen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailOpen")
            .field("name", &self.name)
            .field("inner", &"<handler>")
            .finish()
    }
}

#[async_trait]
impl HookHandler for FailOpen {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        let (next, resume) = next.track();

        let outcome = AssertUnwindSafe(self.inner.handle(&mut *ctx, next))
            .catch_unwind()
            .await;

        let reason = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(
            hook = %ctx.hook,
            hook_name = %self.name,
            reason = %reason,
            "{}: {}",
            self.name,
            reason
        );

        if !resume.was_invoked() {
            resume.run(ctx).await;
        }

        Ok(())
    }
}
