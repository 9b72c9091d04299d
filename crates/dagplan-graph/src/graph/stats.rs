//! Summary statistics for one scheduling run.
//!
//! # Statistics Provided
//!
//! - **`total_issues`**: Issues in the input, excluded ones included.
//! - **`scheduled_issues`**: Issues in the acyclic view (= execution order length).
//! - **`edge_count`**: Resolved, de-duplicated dependency edges of the raw
//!   graph, self-loops included.
//! - **`dropped_references`**: Dependency ids that matched no issue.
//! - **`cycle_count`** / **`blocked_by_cycle_count`**: Reported cycles and the
//!   issues they exclude (members plus downstream issues).
//! - **`max_depth`**, **`group_count`**, **`max_parallelism`**: Shape of the
//!   parallel schedule. `max_parallelism` is the size of the largest group.
//! - **`ready_count`** / **`blocked_count`**: Split of the prioritized queue.
//! - **`total_effort`**: Summed effort of scheduled issues.
//! - **`critical_path_effort`**: Effort along the critical path, i.e. the
//!   shortest possible makespan with unlimited parallelism.
//! - **`root_count`** / **`leaf_count`**: Scheduled issues with no dependencies
//!   / no dependents inside the view.
//!
//! Everything is zero for empty input.

use serde::{Deserialize, Serialize};

use crate::graph::build::BuildWarning;
use crate::graph::critical_path::CriticalPathResult;
use crate::graph::cycles::CycleAnalysis;
use crate::graph::layers::ParallelGroup;
use crate::graph::topo::TopologicalOrder;
use crate::graph::view::AcyclicView;
use crate::queue::PrioritizedQueue;

// ---------------------------------------------------------------------------
// GraphStatistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    pub total_issues: usize,
    pub scheduled_issues: usize,
    pub edge_count: usize,
    pub dropped_references: usize,
    pub cycle_count: usize,
    pub blocked_by_cycle_count: usize,
    pub max_depth: usize,
    pub group_count: usize,
    pub max_parallelism: usize,
    pub ready_count: usize,
    pub blocked_count: usize,
    pub total_effort: f64,
    pub critical_path_effort: f64,
    pub root_count: usize,
    pub leaf_count: usize,
}

impl GraphStatistics {
    /// Collect statistics from the outputs of every pipeline stage.
    #[must_use]
    pub fn compute(
        view: &AcyclicView<'_>,
        cycles: &CycleAnalysis,
        topo: &TopologicalOrder,
        groups: &[ParallelGroup],
        critical_path: &CriticalPathResult,
        queue: &PrioritizedQueue,
    ) -> Self {
        let graph = view.graph();

        let dropped_references = graph
            .warnings
            .iter()
            .filter(|w| matches!(w, BuildWarning::UnresolvedDependency { .. }))
            .count();

        let root_count = view
            .nodes()
            .filter(|&idx| view.dependencies(idx).is_empty())
            .count();
        let leaf_count = view
            .nodes()
            .filter(|&idx| view.dependents(idx).is_empty())
            .count();

        Self {
            total_issues: graph.node_count(),
            scheduled_issues: topo.order.len(),
            edge_count: graph.edge_count(),
            dropped_references,
            cycle_count: cycles.cycles.len(),
            blocked_by_cycle_count: cycles.excluded.count_ones(..),
            max_depth: topo.max_depth(),
            group_count: groups.len(),
            max_parallelism: groups.iter().map(|g| g.issue_ids.len()).max().unwrap_or(0),
            ready_count: queue.ready_for_execution.len(),
            blocked_count: queue.blocked.len(),
            total_effort: topo.order.iter().map(|&idx| view.effort(idx)).sum(),
            critical_path_effort: critical_path.total_effort,
            root_count,
            leaf_count,
        }
    }

    /// Return `true` if any cycle was reported.
    #[must_use]
    pub const fn has_cycles(&self) -> bool {
        self.cycle_count > 0
    }

    /// Ratio of total effort to critical path effort: the average number of
    /// issues that can be worked on at once. 0 when there is no effort.
    #[must_use]
    pub fn parallel_speedup(&self) -> f64 {
        if self.critical_path_effort <= 0.0 {
            return 0.0;
        }
        self.total_effort / self.critical_path_effort
    }
}
