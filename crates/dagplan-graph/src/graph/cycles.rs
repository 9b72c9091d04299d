//! Cycle detection and cycle-blocked propagation.
//!
//! # Edge Direction
//!
//! The dependency graph uses edge direction `blocker → blocked`, so a cycle
//! chain `[A, B, C]` reads "A blocks B blocks C blocks A".
//!
//! # Algorithm
//!
//! 1. **Three-state DFS** (unvisited / in progress / done) over the whole
//!    graph. Roots and neighbours are taken in ascending id order, so the
//!    traversal is reproducible. An edge into an in-progress node is a back
//!    edge; the DFS path from that node to the current node is recorded as a
//!    cycle chain, and the edge itself as a suggested break.
//! 2. **SCC grouping**: chains that share nodes belong to one strongly
//!    connected component (Tarjan). Each non-trivial SCC (or self-loop) is
//!    reported once: its first chain, followed by any members the chain does
//!    not cover, in DFS discovery order. Merging by SCC also picks up members
//!    the DFS only reached through cross edges.
//! 3. **Propagation**: an issue outside every cycle whose dependencies are
//!    *all* cycle-blocked cannot reach a root except through a cycle, so it
//!    is cycle-blocked as well. Issues keeping at least one clean dependency
//!    stay schedulable.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::graph::build::DependencyGraph;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One dependency relation, named from the dependent's point of view.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// The issue that must finish first.
    pub dependency: String,
    /// The issue that declared the dependency.
    pub dependent: String,
}

/// A reported dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleInfo {
    /// Issue ids along the cycle, each blocking the next; the last blocks the
    /// first. Overlapping cycles are merged into one entry.
    pub issue_ids: Vec<String>,
    /// Dependencies whose removal makes this group acyclic (DFS back edges).
    pub suggested_breaks: Vec<DependencyEdge>,
}

/// Output of [`detect_cycles`].
#[derive(Debug, Clone)]
pub struct CycleAnalysis {
    /// Reported cycles, in the order the DFS first closed them.
    pub cycles: Vec<CycleInfo>,
    /// Nodes that sit on a cycle.
    pub members: FixedBitSet,
    /// Cycle members plus nodes reachable only through them.
    pub excluded: FixedBitSet,
}

impl CycleAnalysis {
    #[must_use]
    pub fn is_excluded(&self, idx: NodeIndex) -> bool {
        self.excluded.contains(idx.index())
    }

    #[must_use]
    pub fn is_member(&self, idx: NodeIndex) -> bool {
        self.members.contains(idx.index())
    }

    /// Excluded issue ids in ascending order.
    #[must_use]
    pub fn excluded_ids(&self, graph: &DependencyGraph) -> Vec<String> {
        self.excluded
            .ones()
            .map(|i| graph.id(NodeIndex::new(i)).to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct BackEdge {
    from: NodeIndex,
    to: NodeIndex,
    chain: Vec<NodeIndex>,
}

/// Find every dependency cycle and the issues it blocks.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn detect_cycles(graph: &DependencyGraph) -> CycleAnalysis {
    let n = graph.node_count();
    let (back_edges, discovery) = dfs_back_edges(graph);

    // Non-trivial SCCs and self-loops are the cycle groups.
    let mut component_of: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    for component in tarjan_scc(&graph.graph) {
        let is_cycle = component.len() > 1
            || component
                .first()
                .is_some_and(|&node| graph.graph.contains_edge(node, node));
        if !is_cycle {
            continue;
        }
        for &node in &component {
            component_of[node.index()] = Some(components.len());
        }
        components.push(component);
    }

    let mut chains: Vec<Option<Vec<NodeIndex>>> = vec![None; components.len()];
    let mut breaks: Vec<Vec<DependencyEdge>> = vec![Vec::new(); components.len()];
    let mut report_order: Vec<usize> = Vec::with_capacity(components.len());

    for edge in back_edges {
        let Some(comp) = component_of[edge.to.index()] else {
            continue;
        };
        breaks[comp].push(DependencyEdge {
            dependency: graph.id(edge.from).to_string(),
            dependent: graph.id(edge.to).to_string(),
        });
        if chains[comp].is_none() {
            chains[comp] = Some(edge.chain);
            report_order.push(comp);
        }
    }

    // Every non-trivial SCC closes at least one back edge; keep any stragglers
    // anyway so no member goes unreported.
    report_order.extend(
        chains
            .iter()
            .enumerate()
            .filter(|(_, chain)| chain.is_none())
            .map(|(comp, _)| comp),
    );

    let mut members = FixedBitSet::with_capacity(n);
    let mut cycles: Vec<CycleInfo> = Vec::with_capacity(components.len());

    for comp in report_order {
        let mut ordered: Vec<NodeIndex> = chains[comp].take().unwrap_or_default();
        let mut rest: Vec<NodeIndex> = components[comp]
            .iter()
            .copied()
            .filter(|node| !ordered.contains(node))
            .collect();
        rest.sort_by_key(|node| discovery[node.index()]);
        ordered.extend(rest);

        for node in &ordered {
            members.insert(node.index());
        }

        let mut suggested_breaks = std::mem::take(&mut breaks[comp]);
        suggested_breaks.sort_unstable();

        let cycle = CycleInfo {
            issue_ids: ordered.iter().map(|&idx| graph.id(idx).to_string()).collect(),
            suggested_breaks,
        };
        warn!(issues = ?cycle.issue_ids, "dependency cycle detected");
        cycles.push(cycle);
    }

    let excluded = propagate_blocked(graph, &members);
    let downstream = excluded.count_ones(..) - members.count_ones(..);
    if downstream > 0 {
        warn!(downstream, "issues blocked only through dependency cycles");
    }

    CycleAnalysis {
        cycles,
        members,
        excluded,
    }
}

/// Iterative three-state DFS over dependents, ascending id order.
///
/// Returns the back edges in the order they were found and the discovery
/// index of every node.
fn dfs_back_edges(graph: &DependencyGraph) -> (Vec<BackEdge>, Vec<usize>) {
    let n = graph.node_count();
    let mut marks: Vec<Mark> = vec![Mark::Unvisited; n];
    let mut discovery: Vec<usize> = vec![usize::MAX; n];
    let mut next_discovery = 0_usize;
    let mut back_edges: Vec<BackEdge> = Vec::new();

    // Current DFS path, and for every in-progress node its position in it.
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut path_pos: Vec<usize> = vec![usize::MAX; n];
    // Each frame: (node, its dependents, index of the next one to visit).
    let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();

    for root in graph.graph.node_indices() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }

        marks[root.index()] = Mark::InProgress;
        discovery[root.index()] = next_discovery;
        next_discovery += 1;
        path_pos[root.index()] = path.len();
        path.push(root);
        stack.push((root, graph.dependents(root), 0));

        while let Some((current, neighbors, cursor)) = stack.last_mut() {
            let current = *current;
            if *cursor >= neighbors.len() {
                stack.pop();
                path.pop();
                marks[current.index()] = Mark::Done;
                continue;
            }

            let next = neighbors[*cursor];
            *cursor += 1;

            match marks[next.index()] {
                Mark::InProgress => back_edges.push(BackEdge {
                    from: current,
                    to: next,
                    chain: path[path_pos[next.index()]..].to_vec(),
                }),
                Mark::Unvisited => {
                    marks[next.index()] = Mark::InProgress;
                    discovery[next.index()] = next_discovery;
                    next_discovery += 1;
                    path_pos[next.index()] = path.len();
                    path.push(next);
                    stack.push((next, graph.dependents(next), 0));
                }
                Mark::Done => {}
            }
        }
    }

    (back_edges, discovery)
}

/// Extend `members` with every node whose dependencies are all blocked.
fn propagate_blocked(graph: &DependencyGraph, members: &FixedBitSet) -> FixedBitSet {
    let mut excluded = members.clone();
    let mut queue: VecDeque<NodeIndex> = members
        .ones()
        .flat_map(|i| graph.dependents(NodeIndex::new(i)))
        .collect();

    while let Some(node) = queue.pop_front() {
        if excluded.contains(node.index()) {
            continue;
        }
        let all_blocked = graph
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .all(|dep| excluded.contains(dep.index()));
        if all_blocked {
            excluded.insert(node.index());
            queue.extend(graph.dependents(node));
        }
    }

    excluded
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use dagplan_core::{IssueNode, Priority};

    fn build(issues: &[(&str, &[&str])]) -> DependencyGraph {
        let nodes: Vec<IssueNode> = issues
            .iter()
            .map(|(id, deps)| {
                IssueNode::new(*id, 1.0, Priority::P2).with_dependencies(deps.iter().copied())
            })
            .collect();
        DependencyGraph::build(&nodes).expect("build graph")
    }

    fn excluded(analysis: &CycleAnalysis, graph: &DependencyGraph) -> Vec<String> {
        analysis.excluded_ids(graph)
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = build(&[("a", &[]), ("b", &["a"]), ("c", &["a", "b"])]);
        let analysis = detect_cycles(&graph);

        assert!(analysis.cycles.is_empty());
        assert_eq!(analysis.excluded.count_ones(..), 0);
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        let graph = build(&[]);
        let analysis = detect_cycles(&graph);
        assert!(analysis.cycles.is_empty());
    }

    #[test]
    fn two_node_cycle_is_one_report() {
        // x depends on y, y depends on x
        let graph = build(&[("x", &["y"]), ("y", &["x"])]);
        let analysis = detect_cycles(&graph);

        assert_eq!(analysis.cycles.len(), 1);
        assert_eq!(analysis.cycles[0].issue_ids, vec!["x", "y"]);
        assert_eq!(
            analysis.cycles[0].suggested_breaks,
            vec![DependencyEdge {
                dependency: "y".to_string(),
                dependent: "x".to_string(),
            }]
        );
        assert_eq!(excluded(&analysis, &graph), vec!["x", "y"]);
    }

    #[test]
    fn self_dependency_is_one_node_cycle() {
        let graph = build(&[("a", &["a"]), ("b", &[])]);
        let analysis = detect_cycles(&graph);

        assert_eq!(analysis.cycles.len(), 1);
        assert_eq!(analysis.cycles[0].issue_ids, vec!["a"]);
        assert_eq!(
            analysis.cycles[0].suggested_breaks,
            vec![DependencyEdge {
                dependency: "a".to_string(),
                dependent: "a".to_string(),
            }]
        );
        assert_eq!(excluded(&analysis, &graph), vec!["a"]);
    }

    #[test]
    fn three_node_chain_follows_blocking_order() {
        // a blocks b blocks c blocks a
        let graph = build(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
        let analysis = detect_cycles(&graph);

        assert_eq!(analysis.cycles.len(), 1);
        assert_eq!(analysis.cycles[0].issue_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn overlapping_cycles_are_merged() {
        // a ⇄ b and b ⇄ c share b.
        let graph = build(&[("a", &["b"]), ("b", &["a", "c"]), ("c", &["b"])]);
        let analysis = detect_cycles(&graph);

        assert_eq!(analysis.cycles.len(), 1, "shared node merges the cycles");
        let mut ids = analysis.cycles[0].issue_ids.clone();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(analysis.cycles[0].suggested_breaks.len(), 2);
    }

    #[test]
    fn cross_edge_members_are_still_reported() {
        // Edges: a→b, b→a, a→c, c→b. DFS from a finishes b before reaching
        // c, so c→b is a cross edge; c is still on the cycle a→c→b→a.
        let graph = build(&[("a", &["b"]), ("b", &["a", "c"]), ("c", &["a"])]);
        let analysis = detect_cycles(&graph);

        assert_eq!(analysis.cycles.len(), 1);
        assert_eq!(analysis.cycles[0].issue_ids, vec!["a", "b", "c"]);
        assert_eq!(excluded(&analysis, &graph), vec!["a", "b", "c"]);
    }

    #[test]
    fn disjoint_cycles_are_reported_separately() {
        let graph = build(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("c", &["e"]),
            ("d", &["c"]),
            ("e", &["d"]),
            ("f", &["f"]),
            ("g", &[]),
        ]);
        let analysis = detect_cycles(&graph);

        let reported: Vec<Vec<String>> =
            analysis.cycles.iter().map(|c| c.issue_ids.clone()).collect();
        assert_eq!(
            reported,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string(), "e".to_string()],
                vec!["f".to_string()],
            ]
        );
        assert!(!analysis.is_excluded(graph.node_index("g").expect("g")));
    }

    #[test]
    fn issue_reachable_only_through_cycle_is_excluded() {
        // d depends only on the cycle member x; e depends on d.
        let graph = build(&[
            ("d", &["x"]),
            ("e", &["d"]),
            ("x", &["y"]),
            ("y", &["x"]),
        ]);
        let analysis = detect_cycles(&graph);

        assert_eq!(analysis.cycles.len(), 1);
        assert_eq!(excluded(&analysis, &graph), vec!["d", "e", "x", "y"]);
        assert!(!analysis.is_member(graph.node_index("d").expect("d")));
    }

    #[test]
    fn issue_with_clean_dependency_stays_schedulable() {
        // d depends on the cycle and on root r.
        let graph = build(&[
            ("d", &["r", "x"]),
            ("r", &[]),
            ("x", &["y"]),
            ("y", &["x"]),
        ]);
        let analysis = detect_cycles(&graph);

        assert_eq!(excluded(&analysis, &graph), vec!["x", "y"]);
        assert!(!analysis.is_excluded(graph.node_index("d").expect("d")));
    }

    #[test]
    fn detection_is_independent_of_input_order() {
        let forward = build(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
        let backward = build(&[("c", &["b"]), ("b", &["a"]), ("a", &["c"])]);

        assert_eq!(detect_cycles(&forward).cycles, detect_cycles(&backward).cycles);
    }
}
