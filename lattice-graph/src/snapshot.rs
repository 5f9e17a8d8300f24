//! Immutable graph snapshots.

use lattice_core::{GraphData, Link, Node};
use std::sync::Arc;

/// One consistent view of the graph.
///
/// Snapshots are cheap to clone and structurally shared: appending builds
/// a new snapshot that reuses every existing entry, so entry identity is
/// stable across publishes and consumers can diff by pointer. Every
/// published snapshot is a superset of the one before it.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    nodes: Arc<Vec<Arc<Node>>>,
    links: Arc<Vec<Arc<Link>>>,
}

impl Snapshot {
    /// Builds a snapshot from a bulk payload.
    ///
    /// Link endpoints are collapsed to bare identifiers; the canonical
    /// store never holds nested node-like endpoint shapes.
    pub fn from_data(data: GraphData) -> Self {
        let nodes = data.nodes.into_iter().map(Arc::new).collect();
        let links = data
            .links
            .iter()
            .map(|link| Arc::new(link.normalized()))
            .collect();

        Self {
            nodes: Arc::new(nodes),
            links: Arc::new(links),
        }
    }

    /// The current node set.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    /// The current link set.
    pub fn links(&self) -> &[Arc<Link>] {
        &self.links
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Looks up a node by identifier.
    pub fn node(&self, id: &str) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// True if a node with this identifier exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// True if a link with this (source, target) pair exists.
    pub fn contains_link(&self, source: &str, target: &str) -> bool {
        self.links
            .iter()
            .any(|link| link.source.id() == source && link.target.id() == target)
    }

    /// Builds the next snapshot: this one plus the given appended entries.
    ///
    /// Existing entries are shared, not copied. The appended link is
    /// normalized on the way in.
    pub fn with_appended(&self, node: Option<Node>, link: Option<Link>) -> Snapshot {
        let nodes = match node {
            Some(node) => {
                let mut nodes = self.nodes.as_ref().clone();
                nodes.push(Arc::new(node));
                Arc::new(nodes)
            }
            None => Arc::clone(&self.nodes),
        };

        let links = match link {
            Some(link) => {
                let mut links = self.links.as_ref().clone();
                links.push(Arc::new(link.normalized()));
                Arc::new(links)
            }
            None => Arc::clone(&self.links),
        };

        Snapshot { nodes, links }
    }

    /// Copies the snapshot back out into a wire payload, for export.
    pub fn to_data(&self) -> GraphData {
        GraphData {
            nodes: self.nodes.iter().map(|node| (**node).clone()).collect(),
            links: self.links.iter().map(|link| (**link).clone()).collect(),
        }
    }
}
