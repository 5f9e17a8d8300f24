//! Read-only consumer projections.
//!
//! Every view (room table, space finder, link finder, 3-D graph) works
//! from the same shared snapshots; these helpers derive a view's data
//! without touching the canonical sets. Each call is a projection over
//! exactly one snapshot, so a view never mixes state from two publishes.

use crate::snapshot::Snapshot;
use lattice_core::Node;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::Arc;

/// All nodes flagged as spaces.
pub fn spaces(snapshot: &Snapshot) -> Vec<Arc<Node>> {
    snapshot
        .nodes()
        .iter()
        .filter(|node| node.is_space)
        .cloned()
        .collect()
}

/// Case-insensitive substring search over name, alias, and topic.
pub fn search(snapshot: &Snapshot, query: &str) -> Vec<Arc<Node>> {
    let query = query.to_lowercase();
    snapshot
        .nodes()
        .iter()
        .filter(|node| {
            node.name.to_lowercase().contains(&query)
                || node.alias.to_lowercase().contains(&query)
                || node.topic.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Directed-graph index over one snapshot, for link-direction queries.
///
/// Builds a petgraph graph keyed by node identifier. Links whose endpoints
/// are not in the node set are skipped; they cannot be resolved to an
/// entry and would dangle.
pub struct LinkIndex {
    graph: DiGraph<Arc<Node>, i32>,
    indices: HashMap<String, NodeIndex>,
}

impl LinkIndex {
    /// Builds the index from a snapshot.
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        for node in snapshot.nodes() {
            let index = graph.add_node(Arc::clone(node));
            indices.insert(node.id.clone(), index);
        }

        for link in snapshot.links() {
            let source = indices.get(link.source.id());
            let target = indices.get(link.target.id());
            if let (Some(&source), Some(&target)) = (source, target) {
                graph.add_edge(source, target, link.value);
            }
        }

        Self { graph, indices }
    }

    /// Number of links pointing at this node.
    pub fn incoming(&self, id: &str) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// Number of links leaving this node.
    pub fn outgoing(&self, id: &str) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    fn degree(&self, id: &str, direction: Direction) -> usize {
        self.indices
            .get(id)
            .map(|&index| self.graph.edges_directed(index, direction).count())
            .unwrap_or(0)
    }

    /// Nodes that are the target of at least one link.
    pub fn linked_targets(&self) -> Vec<Arc<Node>> {
        self.nodes_with_degree(Direction::Incoming)
    }

    /// Nodes that are the source of at least one link.
    pub fn linked_sources(&self) -> Vec<Arc<Node>> {
        self.nodes_with_degree(Direction::Outgoing)
    }

    fn nodes_with_degree(&self, direction: Direction) -> Vec<Arc<Node>> {
        self.graph
            .node_indices()
            .filter(|&index| self.graph.edges_directed(index, direction).next().is_some())
            .map(|index| Arc::clone(&self.graph[index]))
            .collect()
    }
}
