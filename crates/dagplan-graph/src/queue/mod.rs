//! Prioritized work queue.
//!
//! # Ordering
//!
//! 1. Score descending.
//! 2. Depth ascending (closer to a root first).
//! 3. Id ascending.
//!
//! The queue holds scheduled issues only. It is then split into
//! `ready_for_execution` (dependencies resolved) and `blocked` (the rest),
//! both keeping queue order. Cycle-blocked issues never reach this module.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One scheduled issue as seen by the queue builder.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub issue_id: String,
    pub score: f64,
    pub depth: usize,
    pub dependencies_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedQueue {
    /// Every scheduled issue, best first.
    pub queue: Vec<String>,
    /// Issues whose dependencies are all resolved, in queue order.
    pub ready_for_execution: Vec<String>,
    /// Queued issues still waiting on a dependency, in queue order.
    pub blocked: Vec<String>,
}

impl PrioritizedQueue {
    /// The first `n` ready issues.
    #[must_use]
    pub fn next_ready(&self, n: usize) -> &[String] {
        &self.ready_for_execution[..n.min(self.ready_for_execution.len())]
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Sort `entries` into a [`PrioritizedQueue`].
#[must_use]
#[instrument(skip_all, fields(entries = entries.len()))]
pub fn build_queue(mut entries: Vec<QueueEntry>) -> PrioritizedQueue {
    entries.sort_by(compare_entries);

    let mut queue = PrioritizedQueue::default();
    for entry in entries {
        if entry.dependencies_resolved {
            queue.ready_for_execution.push(entry.issue_id.clone());
        } else {
            queue.blocked.push(entry.issue_id.clone());
        }
        queue.queue.push(entry.issue_id);
    }

    debug!(
        ready = queue.ready_for_execution.len(),
        blocked = queue.blocked.len(),
        "prioritized queue built"
    );
    queue
}

fn compare_entries(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.depth.cmp(&b.depth))
        .then_with(|| a.issue_id.cmp(&b.issue_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
