//! Dependency graph stages of the scheduler.
//!
//! # Overview
//!
//! Every stage borrows the one arena graph built from the issue list; no
//! stage rebuilds adjacency or copies the graph.
//!
//! ## Pipeline
//!
//! ```text
//! &[IssueNode]
//!        ↓  build::DependencyGraph::build()
//! DependencyGraph (DiGraph, may contain cycles)
//!        ↓  cycles::detect_cycles()
//! CycleAnalysis (cycle reports + excluded node mask)
//!        ↓  view::AcyclicView::new()
//! AcyclicView (excluded nodes and their edges hidden)
//!   ├─ topo::topological_order()            → order + depth
//!   ├─ critical_path::compute_critical_path() → longest effort chain + slack
//!   └─ layers::parallel_groups()            → depth-bucketed batches
//!        ↓  stats::GraphStatistics::compute()
//! GraphStatistics
//! ```
//!
//! ## Cache Invalidation
//!
//! [`DependencyGraph::content_hash`] is a BLAKE3 hash of the canonical issue
//! list. The full analysis folds the scoring configuration into it as well.

pub mod build;
pub mod critical_path;
pub mod cycles;
pub mod layers;
pub mod stats;
pub mod topo;
pub mod view;

pub use build::{BuildWarning, DependencyGraph, MAX_EFFORT_HOURS};
pub use critical_path::{CriticalPathResult, IssueTiming, compute_critical_path};
pub use cycles::{CycleAnalysis, CycleInfo, DependencyEdge, detect_cycles};
pub use layers::{ParallelGroup, parallel_groups};
pub use stats::GraphStatistics;
pub use topo::{TopologicalOrder, topological_order};
pub use view::AcyclicView;
