//! The acyclic scheduling view over a [`DependencyGraph`].
//!
//! Cycle detection marks issues as excluded; everything downstream of it
//! (ordering, critical path, grouping, scoring) sees the graph only through
//! an [`AcyclicView`], which hides excluded nodes and every edge touching
//! them. The underlying arena is never copied or rebuilt.

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::NodeIndex;

use crate::graph::build::DependencyGraph;

/// Borrowed view of the graph minus cycle-blocked issues.
#[derive(Debug, Clone, Copy)]
pub struct AcyclicView<'g> {
    graph: &'g DependencyGraph,
    excluded: &'g FixedBitSet,
}

impl<'g> AcyclicView<'g> {
    #[must_use]
    pub const fn new(graph: &'g DependencyGraph, excluded: &'g FixedBitSet) -> Self {
        Self { graph, excluded }
    }

    #[must_use]
    pub const fn graph(&self) -> &'g DependencyGraph {
        self.graph
    }

    /// Return `true` if `idx` takes part in scheduling.
    #[must_use]
    pub fn contains(&self, idx: NodeIndex) -> bool {
        !self.excluded.contains(idx.index())
    }

    /// Scheduled nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .graph
            .node_indices()
            .filter(move |&idx| self.contains(idx))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count() - self.excluded.count_ones(..)
    }

    /// Dependencies of `idx` inside the view, ascending by id.
    #[must_use]
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Incoming)
    }

    /// Dependents of `idx` inside the view, ascending by id.
    #[must_use]
    pub fn dependents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Outgoing)
    }

    /// Transitive dependencies of `idx` inside the view, ascending by id.
    #[must_use]
    pub fn ancestors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph.ancestors(idx, |n| self.contains(n))
    }

    #[must_use]
    pub fn effort(&self, idx: NodeIndex) -> f64 {
        self.graph.effort(idx)
    }

    fn neighbors(&self, idx: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut out = self.graph.sorted_neighbors(idx, dir);
        out.retain(|&n| n != idx && self.contains(n));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagplan_core::{IssueNode, Priority};

    #[test]
    fn excluded_nodes_and_their_edges_are_hidden() {
        // a → b → c
        let graph = DependencyGraph::build(&[
            IssueNode::new("a", 1.0, Priority::P1),
            IssueNode::new("b", 1.0, Priority::P1).with_dependencies(["a"]),
            IssueNode::new("c", 1.0, Priority::P1).with_dependencies(["b"]),
        ])
        .expect("build graph");
        let a = graph.node_index("a").expect("a");
        let b = graph.node_index("b").expect("b");
        let c = graph.node_index("c").expect("c");

        let mut excluded = FixedBitSet::with_capacity(graph.node_count());
        excluded.insert(b.index());
        let view = AcyclicView::new(&graph, &excluded);

        assert_eq!(view.node_count(), 2);
        assert_eq!(view.nodes().collect::<Vec<_>>(), vec![a, c]);
        assert!(view.dependents(a).is_empty());
        assert!(view.dependencies(c).is_empty());
        assert!(view.ancestors(c).is_empty());
    }
}
