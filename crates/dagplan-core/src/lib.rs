#![forbid(unsafe_code)]
//! dagplan-core library.
//!
//! Shared vocabulary for the scheduler and its callers: the issue input
//! model, scoring configuration, and stable error codes.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for typed failures, `anyhow::Result` at
//!   I/O boundaries (config loading).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;

pub use config::{ConfigError, PriorityWeights, SchedulerConfig, ScoringConfig};
pub use error::ErrorCode;
pub use model::{IssueNode, Priority};
