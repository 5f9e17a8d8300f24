//! Dedup policy: admit or drop one candidate against the existing graph.
//!
//! These two functions are the only place dedup lives. They are pure
//! classifications of (existing collection, candidate) with no I/O, which
//! keeps the policy directly testable and lets the linear scan be swapped
//! for an index later without changing the contract.

use lattice_core::{Link, Node};
use std::sync::Arc;

/// Classification of a candidate against the existing collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Not present yet; append it.
    Absent,
    /// Already present; drop the candidate.
    Present,
}

impl Admission {
    /// True if the candidate should be appended.
    pub fn is_absent(self) -> bool {
        self == Admission::Absent
    }
}

/// Classifies a candidate node.
///
/// A node is present iff an existing node shares its identifier. No
/// field-level merge happens: a re-delivered node with different
/// attributes is dropped and the existing entry wins.
pub fn admit_node(existing: &[Arc<Node>], candidate: &Node) -> Admission {
    if existing.iter().any(|node| node.id == candidate.id) {
        Admission::Present
    } else {
        Admission::Absent
    }
}

/// Classifies a candidate link.
///
/// A link is present iff an existing link has the same (source, target)
/// identifier pair. Endpoints are compared through [`lattice_core::LinkEnd::id`],
/// so a nested node-like endpoint matches a bare identifier. The `value`
/// field plays no part.
pub fn admit_link(existing: &[Arc<Link>], candidate: &Link) -> Admission {
    if existing.iter().any(|link| link.same_endpoints(candidate)) {
        Admission::Present
    } else {
        Admission::Absent
    }
}
