#![forbid(unsafe_code)]
//! dagplan-graph library.
//!
//! Turns a flat list of issues with declared dependencies into an execution
//! plan: cycle report, execution order, parallel groups, critical path and
//! a prioritized queue. See [`analyze`].
//!
//! # Conventions
//!
//! - **Errors**: [`AnalysisError`] (`thiserror`) for fatal input problems;
//!   recoverable anomalies are returned as [`BuildWarning`]s.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Determinism**: node index order is issue-id order; every tie is broken
//!   by id and every output map is a `BTreeMap`.

pub mod analysis;
pub mod error;
pub mod graph;
pub mod queue;
pub mod score;

pub use analysis::{AnalyzedIssue, CriticalPath, GraphAnalysisResult, analyze};
pub use error::AnalysisError;
pub use graph::{BuildWarning, CycleInfo, DependencyEdge, GraphStatistics, ParallelGroup};
pub use queue::PrioritizedQueue;
