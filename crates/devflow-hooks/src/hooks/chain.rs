//! Handler trait and the onion-style continuation chain.
//!
//! A dispatch runs the ordered registrations as nested continuations:
//! each handler receives a [`Next`] that runs the remainder of the chain.
//! Work before `next.run(ctx).await` happens in ascending priority order,
//! work after it in descending order.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::error;

use super::context::HookContext;
use super::definitions::HookType;
use crate::error::HookResult;

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Handles one dispatch.
    ///
    /// Call `next.run(ctx).await` to run the handlers registered after this
    /// one. Not calling it short-circuits the chain; the dispatch still
    /// completes normally.
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()>;
}

/// A named, prioritized binding of a handler to a hook type.
#[derive(Clone)]
pub struct Registration {
    pub(crate) hook: HookType,
    pub(crate) name: String,
    pub(crate) priority: i32,
    pub(crate) handler: Arc<dyn HookHandler>,
}

impl Registration {
    /// Hook type this registration is bound to.
    pub fn hook(&self) -> HookType {
        self.hook
    }

    /// Name, unique per hook type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Priority (lower runs earlier).
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("hook", &self.hook)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("handler", &"<handler>")
            .finish()
    }
}

/// One-shot continuation handed to each handler.
///
/// `run` consumes the value, so a handler can invoke the rest of the
/// chain at most once.
pub struct Next<'a> {
    rest: &'a [Registration],
    invoked: Arc<AtomicBool>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(rest: &'a [Registration]) -> Self {
        Self {
            rest,
            invoked: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs the remaining handlers of the chain.
    pub async fn run(self, ctx: &mut HookContext) {
        self.invoked.store(true, Ordering::SeqCst);
        run_chain(self.rest, ctx).await;
    }

    /// Number of handlers still to run after this one.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Splits off a [`Resume`] handle observing whether this continuation
    /// gets invoked.
    pub(crate) fn track(self) -> (Next<'a>, Resume<'a>) {
        let resume = Resume {
            rest: self.rest,
            invoked: self.invoked.clone(),
        };
        (self, resume)
    }
}

/// Lets a guard run the remainder of the chain on behalf of a handler
/// that failed before invoking its continuation.
pub(crate) struct Resume<'a> {
    rest: &'a [Registration],
    invoked: Arc<AtomicBool>,
}

impl Resume<'_> {
    pub(crate) fn was_invoked(&self) -> bool {
        self.invoked.load(Ordering::SeqCst)
    }

    pub(crate) async fn run(self, ctx: &mut HookContext) {
        if self.invoked.swap(true, Ordering::SeqCst) {
            return;
        }
        run_chain(self.rest, ctx).await;
    }
}

/// Runs `chain[0]` with a continuation over `chain[1..]`.
///
/// Errors and panics of a handler without a fail-open guard are logged
/// here; the chain does not advance past it unless it had already called
/// its continuation.
pub(crate) fn run_chain<'a>(
    chain: &'a [Registration],
    ctx: &'a mut HookContext,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        let Some((current, rest)) = chain.split_first() else {
            return;
        };

        let outcome = AssertUnwindSafe(current.handler.handle(&mut *ctx, Next::new(rest)))
            .catch_unwind()
            .await;

        let reason = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(
            hook = %current.hook,
            hook_name = %current.name,
            reason = %reason,
            "Unguarded hook handler failed: {}: {}",
            current.name,
            reason
        );
    })
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
