//! Deterministic topological order and depth.
//!
//! Kahn's algorithm in batch form: every round takes *all* nodes whose
//! remaining in-degree is zero, sorts them by id, appends them to the order
//! and releases their dependents. The round number is the node's depth,
//! which equals `1 + max(depth of dependencies)` (0 for roots).

use petgraph::graph::NodeIndex;
use tracing::{debug, error, instrument};

use crate::error::AnalysisError;
use crate::graph::view::AcyclicView;

/// Execution order of the scheduled issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Scheduled nodes; every node follows all of its dependencies.
    pub order: Vec<NodeIndex>,
    /// Depth per node index; `None` for nodes outside the view.
    pub depth: Vec<Option<usize>>,
}

impl TopologicalOrder {
    #[must_use]
    pub fn depth_of(&self, idx: NodeIndex) -> Option<usize> {
        self.depth.get(idx.index()).copied().flatten()
    }

    /// Deepest level reached, 0 for an empty order.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.depth.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Order the nodes of `view`.
///
/// # Errors
///
/// Returns [`AnalysisError::ResidualCycle`] if some nodes never reach
/// in-degree zero. Cycle removal upstream makes this unreachable in practice.
#[instrument(skip_all, fields(nodes = view.node_count()))]
pub fn topological_order(view: &AcyclicView<'_>) -> Result<TopologicalOrder, AnalysisError> {
    let n = view.graph().node_count();
    let mut indegree: Vec<usize> = vec![0; n];
    for idx in view.nodes() {
        indegree[idx.index()] = view.dependencies(idx).len();
    }

    let mut ready: Vec<NodeIndex> = view
        .nodes()
        .filter(|idx| indegree[idx.index()] == 0)
        .collect();
    let mut depth: Vec<Option<usize>> = vec![None; n];
    let mut order: Vec<NodeIndex> = Vec::with_capacity(view.node_count());
    let mut level = 0_usize;

    while !ready.is_empty() {
        let mut next: Vec<NodeIndex> = Vec::new();

        for &idx in &ready {
            depth[idx.index()] = Some(level);
            order.push(idx);

            for dependent in view.dependents(idx) {
                let remaining = &mut indegree[dependent.index()];
                *remaining -= 1;
                if *remaining == 0 {
                    next.push(dependent);
                }
            }
        }

        next.sort_unstable();
        ready = next;
        level += 1;
    }

    if order.len() != view.node_count() {
        let ids: Vec<String> = view
            .nodes()
            .filter(|idx| depth[idx.index()].is_none())
            .map(|idx| view.graph().id(idx).to_string())
            .collect();
        error!(?ids, "nodes left unordered after cycle removal");
        return Err(AnalysisError::ResidualCycle { ids });
    }

    debug!(levels = level, "topological order computed");
    Ok(TopologicalOrder { order, depth })
}
