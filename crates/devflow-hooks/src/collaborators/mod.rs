//! External collaborators read or driven by the built-in hooks.
//!
//! Each collaborator is a trait so hosts and tests can substitute their
//! own implementation; the default implementations are file or process
//! backed.

pub mod evaluator;
pub mod registry;
pub mod switcher;

pub use evaluator::{CommandEvaluator, EvaluationReport, Evaluator};
pub use registry::{JsonProjectRegistry, ProjectRegistry, RegistrySettings, RegistrySnapshot};
pub use switcher::{MarkerFileSwitcher, ProjectSwitcher};
