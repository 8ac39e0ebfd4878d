//! # devflow-core
//!
//! Core crate for Devflow. Contains the configuration schema and loader,
//! the unified error system, and the result alias shared by every other
//! Devflow crate.
//!
//! This crate has **no** internal dependencies on other Devflow crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::DevflowConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
