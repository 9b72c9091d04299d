//! The scheduling entry point.
//!
//! [`analyze`] runs every stage over one issue list and merges the outputs
//! into a [`GraphAnalysisResult`]. It is a pure function of its inputs:
//! the same issues (in any order) and configuration always serialize to the
//! same bytes.
//!
//! # Readiness
//!
//! An issue has its dependencies resolved when every resolved dependency is
//! marked `completed` by the caller and none of them is cycle-blocked.
//! Unknown dependency ids were already dropped with a warning and do not
//! count.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use dagplan_core::{IssueNode, SchedulerConfig};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::AnalysisError;
use crate::graph::build::{BuildWarning, DependencyGraph};
use crate::graph::critical_path::{CriticalPathResult, compute_critical_path};
use crate::graph::cycles::{CycleAnalysis, CycleInfo, detect_cycles};
use crate::graph::layers::{ParallelGroup, parallel_groups};
use crate::graph::stats::GraphStatistics;
use crate::graph::topo::{TopologicalOrder, topological_order};
use crate::graph::view::AcyclicView;
use crate::queue::{PrioritizedQueue, QueueEntry, build_queue};
use crate::score::{ScoreInputs, priority_score};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// An input issue together with everything the scheduler derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedIssue {
    /// The issue as given, with effort normalized.
    pub issue: IssueNode,
    /// Direct dependency ids, ascending. Scheduled issues list only
    /// dependencies inside the scheduling view, so an edge into a
    /// cycle-blocked issue shows up in `blocked_by` instead.
    pub dependencies: Vec<String>,
    /// Direct dependent ids, ascending, under the same rule.
    pub dependents: Vec<String>,
    /// Ancestor closure of `dependencies`, ascending.
    pub transitive_dependencies: Vec<String>,
    /// `None` for cycle-blocked issues.
    pub depth: Option<usize>,
    /// `None` for cycle-blocked issues.
    pub priority_score: Option<f64>,
    pub is_on_critical_path: bool,
    pub dependencies_resolved: bool,
    /// Resolved dependencies that keep this issue from starting: not yet
    /// completed, or cycle-blocked. Ascending; empty iff
    /// `dependencies_resolved`.
    pub blocked_by: Vec<String>,
    pub blocked_by_cycle: bool,
    pub earliest_start_hours: Option<f64>,
    pub earliest_finish_hours: Option<f64>,
    pub slack_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    /// Ids from a root to the end of the longest effort chain.
    pub issue_ids: Vec<String>,
    pub total_effort: f64,
}

/// Complete output of one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAnalysisResult {
    pub issues: BTreeMap<String, AnalyzedIssue>,
    pub execution_order: Vec<String>,
    pub parallel_groups: Vec<ParallelGroup>,
    pub critical_path: CriticalPath,
    pub prioritized_queue: PrioritizedQueue,
    pub statistics: GraphStatistics,
    pub cycles: Vec<CycleInfo>,
    /// Cycle members and issues reachable only through them, ascending.
    pub blocked_by_cycle: Vec<String>,
    pub warnings: Vec<BuildWarning>,
    /// BLAKE3 over the canonical input and the scoring configuration.
    pub content_hash: String,
}

impl GraphAnalysisResult {
    #[must_use]
    pub fn issue(&self, id: &str) -> Option<&AnalyzedIssue> {
        self.issues.get(id)
    }

    /// Return `true` if every issue could be scheduled.
    #[must_use]
    pub const fn is_fully_schedulable(&self) -> bool {
        self.blocked_by_cycle.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Analyze `issues` under `config`.
///
/// # Errors
///
/// - [`AnalysisError::InvalidConfig`] when `config` fails validation; checked
///   before any graph work.
/// - [`AnalysisError::EmptyIssueId`] / [`AnalysisError::DuplicateIssueIds`]
///   for ambiguous issue identities.
/// - [`AnalysisError::ResidualCycle`] if cycle removal left a cycle behind.
#[instrument(skip_all, fields(issues = issues.len()))]
pub fn analyze(
    issues: &[IssueNode],
    config: &SchedulerConfig,
) -> Result<GraphAnalysisResult, AnalysisError> {
    config.validate()?;

    let graph = DependencyGraph::build(issues)?;
    let cycles = detect_cycles(&graph);
    let view = AcyclicView::new(&graph, &cycles.excluded);
    let topo = topological_order(&view)?;
    let critical_path = compute_critical_path(&view, &topo);
    let groups = parallel_groups(&view, &topo);

    let mut analyzed: BTreeMap<String, AnalyzedIssue> = BTreeMap::new();
    let mut entries: Vec<QueueEntry> = Vec::with_capacity(topo.order.len());

    for idx in graph.graph.node_indices() {
        let record = analyze_issue(&view, &cycles, &topo, &critical_path, config, idx);
        if let (Some(score), Some(depth)) = (record.priority_score, record.depth) {
            entries.push(QueueEntry {
                issue_id: record.issue.id.clone(),
                score,
                depth,
                dependencies_resolved: record.dependencies_resolved,
            });
        }
        analyzed.insert(record.issue.id.clone(), record);
    }

    let queue = build_queue(entries);
    let statistics =
        GraphStatistics::compute(&view, &cycles, &topo, &groups, &critical_path, &queue);

    info!(
        scheduled = statistics.scheduled_issues,
        cycles = statistics.cycle_count,
        blocked_by_cycle = statistics.blocked_by_cycle_count,
        groups = statistics.group_count,
        critical_path_effort = statistics.critical_path_effort,
        "dependency analysis complete"
    );

    Ok(GraphAnalysisResult {
        issues: analyzed,
        execution_order: ids(&graph, &topo.order),
        parallel_groups: groups,
        critical_path: CriticalPath {
            issue_ids: ids(&graph, &critical_path.path),
            total_effort: critical_path.total_effort,
        },
        prioritized_queue: queue,
        statistics,
        blocked_by_cycle: cycles.excluded_ids(&graph),
        cycles: cycles.cycles,
        content_hash: result_hash(&graph.content_hash, config),
        warnings: graph.warnings.clone(),
    })
}

fn analyze_issue(
    view: &AcyclicView<'_>,
    cycles: &CycleAnalysis,
    topo: &TopologicalOrder,
    critical_path: &CriticalPathResult,
    config: &SchedulerConfig,
    idx: NodeIndex,
) -> AnalyzedIssue {
    let graph = view.graph();
    let issue = graph.issue(idx).clone();
    let blocked_by_cycle = cycles.is_excluded(idx);

    let raw_dependencies = graph.dependencies(idx);
    let blocked_by: Vec<NodeIndex> = raw_dependencies
        .iter()
        .copied()
        .filter(|&dep| !graph.issue(dep).completed || cycles.is_excluded(dep))
        .collect();
    let dependencies_resolved = blocked_by.is_empty();

    let (dependencies, dependents, transitive) = if blocked_by_cycle {
        (
            raw_dependencies,
            graph.dependents(idx),
            graph.ancestors(idx, |_| true),
        )
    } else {
        (view.dependencies(idx), view.dependents(idx), view.ancestors(idx))
    };

    let depth = topo.depth_of(idx);
    let is_on_critical_path = critical_path.contains(idx);
    let priority_score = (!blocked_by_cycle).then(|| {
        priority_score(
            &ScoreInputs {
                priority: issue.priority,
                on_critical_path: is_on_critical_path,
                dependent_count: dependents.len(),
                effort_hours: issue.effort_hours,
            },
            &config.scoring,
        )
    });
    let timing = critical_path.timing(idx);

    AnalyzedIssue {
        dependencies: ids(graph, &dependencies),
        dependents: ids(graph, &dependents),
        transitive_dependencies: ids(graph, &transitive),
        depth,
        priority_score,
        is_on_critical_path,
        dependencies_resolved,
        blocked_by: ids(graph, &blocked_by),
        blocked_by_cycle,
        earliest_start_hours: timing.map(|t| t.earliest_start),
        earliest_finish_hours: timing.map(|t| t.earliest_finish),
        slack_hours: timing.map(|t| t.slack),
        issue,
    }
}

fn ids(graph: &DependencyGraph, nodes: &[NodeIndex]) -> Vec<String> {
    nodes.iter().map(|&idx| graph.id(idx).to_string()).collect()
}

/// Fold the scoring configuration into the input hash.
fn result_hash(input_hash: &str, config: &SchedulerConfig) -> String {
    let scoring = &config.scoring;
    let weights = &scoring.priority_weights;
    let mut hasher = blake3::Hasher::new();
    hasher.update(input_hash.as_bytes());
    for value in [
        weights.p0,
        weights.p1,
        weights.p2,
        weights.p3,
        scoring.critical_path_bonus,
        scoring.dependent_multiplier,
        scoring.quick_win_bonus,
        scoring.quick_win_threshold_hours,
    ] {
        hasher.update(&value.to_bits().to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
