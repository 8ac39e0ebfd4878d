//! Hook system: typed hook points, the dispatch context, the manager,
//! the continuation chain, and the fail-open wrapper.

pub mod chain;
pub mod context;
pub mod definitions;
pub mod fail_open;
pub mod manager;

pub use chain::{HookHandler, Next, Registration};
pub use context::HookContext;
pub use definitions::HookType;
pub use fail_open::FailOpen;
pub use manager::{DEFAULT_PRIORITY, HookManager, RegisterOptions};
