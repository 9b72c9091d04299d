//! Parallel execution groups.
//!
//! Issues are bucketed by depth: group `k` holds every scheduled issue at
//! depth `k`. All dependencies of a group-`k` member sit at a smaller depth,
//! so no two members of one group depend on each other and a group can run
//! as soon as every earlier group has finished.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::topo::TopologicalOrder;
use crate::graph::view::AcyclicView;

/// A batch of mutually independent issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelGroup {
    /// 0-based; equals the depth of every member.
    pub group_index: usize,
    /// Member ids, ascending.
    pub issue_ids: Vec<String>,
    /// Summed effort of the members, in hours.
    pub total_effort: f64,
}

/// Partition the scheduled issues of `view` into depth groups.
#[must_use]
#[instrument(skip_all, fields(nodes = topo.order.len()))]
pub fn parallel_groups(view: &AcyclicView<'_>, topo: &TopologicalOrder) -> Vec<ParallelGroup> {
    if topo.order.is_empty() {
        return Vec::new();
    }

    let mut buckets: Vec<Vec<NodeIndex>> = vec![Vec::new(); topo.max_depth() + 1];
    // Ascending index order keeps every bucket sorted by id.
    for idx in view.nodes() {
        if let Some(depth) = topo.depth_of(idx) {
            buckets[depth].push(idx);
        }
    }

    let groups: Vec<ParallelGroup> = buckets
        .into_iter()
        .enumerate()
        .map(|(group_index, members)| ParallelGroup {
            group_index,
            total_effort: members.iter().map(|&idx| view.effort(idx)).sum(),
            issue_ids: members
                .iter()
                .map(|&idx| view.graph().id(idx).to_string())
                .collect(),
        })
        .collect();

    debug!(groups = groups.len(), "parallel groups computed");
    groups
}
