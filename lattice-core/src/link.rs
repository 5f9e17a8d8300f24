//! Directed links between nodes.

use serde::{Deserialize, Serialize};

/// One endpoint of a link as it appears on the wire.
///
/// Producers are inconsistent here: the push feed sends bare node
/// identifiers, while bulk payloads that have been through a force-layout
/// nest a node-like object under the endpoint. Identity comparisons always
/// go through [`LinkEnd::id`], so both shapes compare equal when they name
/// the same node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEnd {
    /// A bare node identifier.
    Id(String),
    /// A nested node-like object. Only the identifier matters; any other
    /// fields are dropped on deserialization.
    Node { id: String },
}

impl LinkEnd {
    /// The node identifier this endpoint names.
    pub fn id(&self) -> &str {
        match self {
            LinkEnd::Id(id) => id,
            LinkEnd::Node { id } => id,
        }
    }
}

impl From<&str> for LinkEnd {
    fn from(id: &str) -> Self {
        LinkEnd::Id(id.to_string())
    }
}

impl From<String> for LinkEnd {
    fn from(id: String) -> Self {
        LinkEnd::Id(id)
    }
}

/// A directed reference from one node to another.
///
/// A link is identified by its (source, target) pair. `value` rides along
/// from the feed but plays no part in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub source: LinkEnd,
    pub target: LinkEnd,

    /// Link weight from the feed. Not part of link identity.
    #[serde(default)]
    pub value: i32,
}

impl Link {
    /// Creates a link between two node identifiers.
    pub fn new(source: impl Into<LinkEnd>, target: impl Into<LinkEnd>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value: 0,
        }
    }

    /// True if both links reference the same (source, target) pair,
    /// comparing identifiers regardless of endpoint shape.
    pub fn same_endpoints(&self, other: &Link) -> bool {
        self.source.id() == other.source.id() && self.target.id() == other.target.id()
    }

    /// Returns this link with both endpoints collapsed to bare
    /// identifiers. The canonical store only ever holds this shape.
    pub fn normalized(&self) -> Link {
        Link {
            source: LinkEnd::Id(self.source.id().to_string()),
            target: LinkEnd::Id(self.target.id().to_string()),
            value: self.value,
        }
    }
}
