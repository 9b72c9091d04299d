//! Effort-weighted critical path analysis.
//!
//! # Overview
//!
//! The critical path is the dependency chain with the largest summed effort.
//! Issues on it have **zero slack**: delaying any of them delays the
//! earliest possible completion of the whole plan.
//!
//! # Definitions
//!
//! All durations are in hours of estimated effort.
//!
//! | Term              | Definition |
//! |-------------------|------------|
//! | `earliest_start`  | Largest `earliest_finish` among dependencies (0 for roots). |
//! | `earliest_finish` | `earliest_start + effort`; the longest chain ending here. |
//! | `latest_finish`   | Latest finish that does not delay the plan. |
//! | `latest_start`    | `latest_finish - effort`. |
//! | `slack`           | `latest_finish - earliest_finish`, zero on the critical path. |
//!
//! # Algorithm
//!
//! 1. **Forward pass** over the topological order:
//!    `longest[v] = effort(v) + max(longest[u] for u in deps(v), default 0)`,
//!    remembering the dependency that supplied the max (ties → smallest id).
//! 2. **End node**: `argmax(longest)`, ties → smallest id.
//! 3. **Reconstruction**: follow predecessor pointers back to a root.
//! 4. **Backward pass** in reverse order for `latest_finish` and slack.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::topo::TopologicalOrder;
use crate::graph::view::AcyclicView;

/// Slack below this is floating-point noise from the backward pass.
const SLACK_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Per-issue schedule timing from the forward and backward passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTiming {
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    /// Zero for issues on a critical path.
    pub slack: f64,
}

/// Result of critical path analysis.
#[derive(Debug, Clone)]
pub struct CriticalPathResult {
    /// Nodes on the critical path, roots first.
    pub path: Vec<NodeIndex>,
    /// Summed effort along `path`.
    pub total_effort: f64,
    /// Membership mask for `path`.
    pub on_path: FixedBitSet,
    /// Timing per node index; `None` outside the view.
    pub timings: Vec<Option<IssueTiming>>,
}

impl CriticalPathResult {
    #[must_use]
    pub fn empty(node_count: usize) -> Self {
        Self {
            path: Vec::new(),
            total_effort: 0.0,
            on_path: FixedBitSet::with_capacity(node_count),
            timings: vec![None; node_count],
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.on_path.contains(idx.index())
    }

    #[must_use]
    pub fn timing(&self, idx: NodeIndex) -> Option<IssueTiming> {
        self.timings.get(idx.index()).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute the critical path over `view`, walking `topo.order`.
#[must_use]
#[instrument(skip_all, fields(nodes = topo.order.len()))]
pub fn compute_critical_path(view: &AcyclicView<'_>, topo: &TopologicalOrder) -> CriticalPathResult {
    let n = view.graph().node_count();
    if topo.order.is_empty() {
        return CriticalPathResult::empty(n);
    }

    // --- Forward pass ---
    let mut earliest_finish: Vec<f64> = vec![0.0; n];
    let mut earliest_start: Vec<f64> = vec![0.0; n];
    let mut predecessor: Vec<Option<NodeIndex>> = vec![None; n];

    for &v in &topo.order {
        let mut best: Option<(NodeIndex, f64)> = None;
        // Dependencies arrive in ascending id order; only a strictly longer
        // chain replaces the current best, so ties keep the smaller id.
        for u in view.dependencies(v) {
            let candidate = earliest_finish[u.index()];
            if best.is_none_or(|(_, current)| candidate > current) {
                best = Some((u, candidate));
            }
        }

        let start = best.map_or(0.0, |(_, finish)| finish);
        earliest_start[v.index()] = start;
        earliest_finish[v.index()] = start + view.effort(v);
        predecessor[v.index()] = best.map(|(u, _)| u);
    }

    // --- End node: longest chain, smallest id on ties ---
    let mut end: Option<NodeIndex> = None;
    for v in view.nodes() {
        if end.is_none_or(|e| earliest_finish[v.index()] > earliest_finish[e.index()]) {
            end = Some(v);
        }
    }
    let Some(end) = end else {
        return CriticalPathResult::empty(n);
    };
    let total_effort = earliest_finish[end.index()];

    // --- Reconstruction ---
    let mut path: Vec<NodeIndex> = vec![end];
    let mut cursor = end;
    while let Some(prev) = predecessor[cursor.index()] {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();

    let mut on_path = FixedBitSet::with_capacity(n);
    for idx in &path {
        on_path.insert(idx.index());
    }

    // --- Backward pass ---
    let mut latest_finish: Vec<f64> = vec![total_effort; n];
    for &v in topo.order.iter().rev() {
        let bound = view
            .dependents(v)
            .into_iter()
            .map(|w| latest_finish[w.index()] - view.effort(w))
            .fold(total_effort, f64::min);
        latest_finish[v.index()] = bound;
    }

    let mut timings: Vec<Option<IssueTiming>> = vec![None; n];
    for &v in &topo.order {
        let i = v.index();
        let effort = view.effort(v);
        let mut slack = (latest_finish[i] - earliest_finish[i]).max(0.0);
        if slack < SLACK_EPSILON {
            slack = 0.0;
        }
        timings[i] = Some(IssueTiming {
            earliest_start: earliest_start[i],
            earliest_finish: earliest_finish[i],
            latest_start: latest_finish[i] - effort,
            latest_finish: latest_finish[i],
            slack,
        });
    }

    debug!(
        length = path.len(),
        total_effort,
        "critical path computed"
    );

    CriticalPathResult {
        path,
        total_effort,
        on_path,
        timings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
