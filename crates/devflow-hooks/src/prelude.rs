//! Convenience re-exports for writing custom hooks.

pub use async_trait::async_trait;

pub use crate::error::{HookError, HookResult};
pub use crate::hooks::chain::{HookHandler, Next};
pub use crate::hooks::context::HookContext;
pub use crate::hooks::definitions::HookType;
pub use crate::hooks::fail_open::FailOpen;
pub use crate::hooks::manager::{HookManager, RegisterOptions};
pub use crate::traits::{ClosureHandler, SimpleHandlerAdapter, SimpleHookHandler};
