//! Graph construction from a flat issue list.
//!
//! # Overview
//!
//! [`DependencyGraph::build`] validates the issue list and builds the single
//! [`petgraph`] arena every later stage borrows. Nothing downstream rebuilds
//! adjacency; cycle detection, ordering, critical path and grouping all take
//! the graph by reference and address issues by `NodeIndex`.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A **blocks** B": B lists A in its `dependencies`
//! and cannot start before A is done. Incoming edges of a node are its
//! dependencies, outgoing edges are its dependents.
//!
//! ## Node Order
//!
//! Nodes are inserted in ascending id order, so `NodeIndex` order *is* id
//! order. Every "ties broken by ascending id" rule downstream relies on this
//! and compares indices directly.
//!
//! ## Validation
//!
//! | Input anomaly              | Handling |
//! |----------------------------|----------|
//! | duplicate id               | fatal [`AnalysisError::DuplicateIssueIds`] |
//! | empty / blank id           | fatal [`AnalysisError::EmptyIssueId`] |
//! | unknown dependency id      | [`BuildWarning::UnresolvedDependency`], edge dropped |
//! | negative, non-finite or above [`MAX_EFFORT_HOURS`] effort | [`BuildWarning::InvalidEffort`], effort treated as 0 |
//! | repeated dependency id     | collapsed into one edge |
//! | self-dependency            | kept as a self-loop, reported as a 1-node cycle |

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

use dagplan_core::IssueNode;
use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::AnalysisError;

/// Largest accepted effort estimate, in hours.
///
/// Effort sums along any chain stay finite below this bound, so critical path
/// totals and slack never overflow to infinity.
pub const MAX_EFFORT_HOURS: f64 = 1.0e12;

// ---------------------------------------------------------------------------
// BuildWarning
// ---------------------------------------------------------------------------

/// A recoverable input anomaly. The run continues; the anomaly is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BuildWarning {
    /// `issue_id` depends on an id that no issue carries. The edge is dropped.
    UnresolvedDependency {
        issue_id: String,
        dependency_id: String,
    },
    /// `issue_id` declared a negative, non-finite or oversized effort; 0 is
    /// used instead.
    InvalidEffort { issue_id: String, effort_hours: f64 },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedDependency {
                issue_id,
                dependency_id,
            } => write!(
                f,
                "{issue_id} depends on unknown issue {dependency_id}; dependency dropped"
            ),
            Self::InvalidEffort {
                issue_id,
                effort_hours,
            } => write!(
                f,
                "{issue_id} has invalid effort {effort_hours}; treated as 0 hours"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// The validated dependency graph for one scheduling run.
///
/// Node weights are issue ids. `issues[i]` is the (effort-normalized) record
/// for `NodeIndex::new(i)`.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Directed graph: nodes = issue ids, edges = blocking relationships.
    pub graph: DiGraph<String, ()>,
    /// Issue records indexed by node index.
    pub issues: Vec<IssueNode>,
    /// Mapping from issue id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Recoverable anomalies: effort fixes first, then dropped references,
    /// each group in issue-id order.
    pub warnings: Vec<BuildWarning>,
    /// BLAKE3 hash of the canonical (sorted) issue list.
    pub content_hash: String,
}

impl DependencyGraph {
    /// Validate `issues` and build the arena graph.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyIssueId`] for a blank id and
    /// [`AnalysisError::DuplicateIssueIds`] when any id occurs more than once.
    /// No graph is produced in either case.
    #[instrument(skip_all, fields(issues = issues.len()))]
    pub fn build(issues: &[IssueNode]) -> Result<Self, AnalysisError> {
        validate_ids(issues)?;

        let mut sorted: Vec<&IssueNode> = issues.iter().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut graph = DiGraph::<String, ()>::with_capacity(sorted.len(), sorted.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(sorted.len());
        let mut records: Vec<IssueNode> = Vec::with_capacity(sorted.len());
        let mut warnings: Vec<BuildWarning> = Vec::new();

        for issue in &sorted {
            let idx = graph.add_node(issue.id.clone());
            node_map.insert(issue.id.clone(), idx);

            let mut record = (*issue).clone();
            if !(0.0..=MAX_EFFORT_HOURS).contains(&record.effort_hours) {
                warn!(
                    issue = %record.id,
                    effort = record.effort_hours,
                    "invalid effort estimate, using 0"
                );
                warnings.push(BuildWarning::InvalidEffort {
                    issue_id: record.id.clone(),
                    effort_hours: record.effort_hours,
                });
                record.effort_hours = 0.0;
            }
            records.push(record);
        }

        for issue in &sorted {
            let dependent = node_map[&issue.id];
            let mut seen: BTreeSet<&str> = BTreeSet::new();

            for dep in &issue.dependencies {
                if !seen.insert(dep.as_str()) {
                    debug!(issue = %issue.id, dependency = %dep, "repeated dependency collapsed");
                    continue;
                }

                let Some(&dependency) = node_map.get(dep) else {
                    warn!(issue = %issue.id, dependency = %dep, "unresolved dependency dropped");
                    warnings.push(BuildWarning::UnresolvedDependency {
                        issue_id: issue.id.clone(),
                        dependency_id: dep.clone(),
                    });
                    continue;
                };

                graph.add_edge(dependency, dependent, ());
            }
        }

        let content_hash = compute_issue_hash(&records);

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            warnings = warnings.len(),
            "dependency graph built"
        );

        Ok(Self {
            graph,
            issues: records,
            node_map,
            warnings,
            content_hash,
        })
    }

    /// Return the number of nodes (issues) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of resolved dependency edges, self-loops included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for an issue id.
    #[must_use]
    pub fn node_index(&self, issue_id: &str) -> Option<NodeIndex> {
        self.node_map.get(issue_id).copied()
    }

    /// Return the issue id label for a node.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this graph.
    #[must_use]
    pub fn id(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Return the issue record for a node.
    #[must_use]
    pub fn issue(&self, idx: NodeIndex) -> &IssueNode {
        &self.issues[idx.index()]
    }

    /// Effort of a node in hours (never negative).
    #[must_use]
    pub fn effort(&self, idx: NodeIndex) -> f64 {
        self.issues[idx.index()].effort_hours
    }

    /// Resolved direct dependencies of `idx`, ascending by id.
    #[must_use]
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.sorted_neighbors(idx, Direction::Incoming)
    }

    /// Resolved direct dependents of `idx`, ascending by id.
    #[must_use]
    pub fn dependents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.sorted_neighbors(idx, Direction::Outgoing)
    }

    pub(crate) fn sorted_neighbors(&self, idx: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Every node reachable from `start` by walking dependency edges
    /// backwards, restricted to nodes for which `include` holds.
    ///
    /// `start` itself is never part of the result, even on a cycle.
    #[must_use]
    pub fn ancestors(&self, start: NodeIndex, include: impl Fn(NodeIndex) -> bool) -> Vec<NodeIndex> {
        let mut visited = FixedBitSet::with_capacity(self.node_count());
        visited.insert(start.index());
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
        let mut found: Vec<NodeIndex> = Vec::new();

        while let Some(current) = queue.pop_front() {
            for dep in self.graph.neighbors_directed(current, Direction::Incoming) {
                if !include(dep) || visited.put(dep.index()) {
                    continue;
                }
                found.push(dep);
                queue.push_back(dep);
            }
        }

        found.sort_unstable();
        found
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_ids(issues: &[IssueNode]) -> Result<(), AnalysisError> {
    if let Some(position) = issues.iter().position(|issue| issue.id.trim().is_empty()) {
        return Err(AnalysisError::EmptyIssueId { position });
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.id.as_str()).or_insert(0) += 1;
    }

    let duplicates: Vec<String> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::DuplicateIssueIds { ids: duplicates })
    }
}

/// Compute a BLAKE3 hash over the sorted, normalized issue records.
fn compute_issue_hash(records: &[IssueNode]) -> String {
    let mut hasher = blake3::Hasher::new();
    for issue in records {
        hasher.update(issue.id.as_bytes());
        hasher.update(b"\x00");
        hasher.update(issue.title.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&issue.effort_hours.to_bits().to_le_bytes());
        hasher.update(issue.priority.to_string().as_bytes());
        hasher.update(&[u8::from(issue.completed)]);
        for dep in &issue.dependencies {
            hasher.update(dep.as_bytes());
            hasher.update(b"\x1f");
        }
        hasher.update(b"\x1e");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
