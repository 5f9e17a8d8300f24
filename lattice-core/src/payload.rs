//! Bulk snapshot payload.

use crate::link::Link;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// The full graph as returned by the one-shot bulk fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl GraphData {
    /// Creates a payload from node and link collections.
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_bulk_payload() {
        let json = r#"{
            "nodes": [
                {"id": "!a:x", "name": "A", "is_space": true},
                {"id": "!b:x", "name": "B"}
            ],
            "links": [
                {"source": "!a:x", "target": "!b:x", "value": 1}
            ]
        }"#;

        let data: GraphData = serde_json::from_str(json).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.links.len(), 1);
        assert!(data.nodes[0].is_space);
    }
}
