//! # devflow-hooks
//!
//! Hook orchestration engine for Devflow. Provides:
//!
//! - Five fixed hook types and a free-form, JSON-backed dispatch context
//! - A manager with named, priority-ordered registrations per hook type
//! - Onion-style dispatch: each handler runs the rest of the chain through
//!   a one-shot continuation and may do work before and after it
//! - A fail-open wrapper that logs and contains handler failures
//! - Built-in hooks: config backup, cached project resolution, scored
//!   suggestions, change-triggered critical review, switch audit

pub mod builtin;
pub mod collaborators;
pub mod error;
pub mod hooks;
pub mod prelude;
pub mod registration;
pub mod traits;

pub use error::{HookError, HookResult};
pub use hooks::{
    DEFAULT_PRIORITY, FailOpen, HookContext, HookHandler, HookManager, HookType, Next,
    RegisterOptions, Registration,
};
pub use registration::{BuiltinDeps, BuiltinHooks, register_builtin_hooks};
pub use traits::{ClosureHandler, SimpleHandlerAdapter, SimpleHookHandler};
