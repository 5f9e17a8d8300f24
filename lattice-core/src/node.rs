//! Room and space nodes.

use serde::{Deserialize, Serialize};

/// A room or space in the federated graph.
///
/// The `id` is the stable identity: two nodes with the same `id` are the
/// same entity regardless of any other field, and identity never changes
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable unique identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Server-qualified human-readable alias.
    #[serde(default)]
    pub alias: String,

    /// Opaque media locator for the avatar. May be empty.
    #[serde(default)]
    pub avatar: String,

    /// Free-text topic.
    #[serde(default)]
    pub topic: String,

    /// Layout weight. Kept as the wire string.
    #[serde(default)]
    pub weight: String,

    /// Whether this node is a space rather than a room.
    #[serde(default)]
    pub is_space: bool,

    /// Render-once marker for consumers that decorate nodes in place.
    /// The engine never sets this.
    #[serde(default)]
    pub updated: bool,
}

impl Node {
    /// Creates a node with the given identity and name. All other fields
    /// start empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alias: String::new(),
            avatar: String::new(),
            topic: String::new(),
            weight: String::new(),
            is_space: false,
            updated: false,
        }
    }

    /// Sets the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Sets the topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Marks the node as a space.
    pub fn as_space(mut self) -> Self {
        self.is_space = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_shape() {
        let json = r#"{
            "id": "!abc:example.org",
            "name": "General",
            "alias": "#general:example.org",
            "avatar": "mxc://example.org/xyz",
            "topic": "Hello",
            "weight": "3",
            "is_space": false
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, "!abc:example.org");
        assert_eq!(node.alias, "#general:example.org");
        assert!(!node.is_space);
        assert!(!node.updated);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let node: Node = serde_json::from_str(r#"{"id": "!a:x"}"#).unwrap();
        assert_eq!(node.name, "");
        assert_eq!(node.weight, "");
        assert!(!node.is_space);
    }
}
