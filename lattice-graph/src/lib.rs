//! Lattice Graph - Canonical graph state and dedup policy
//!
//! This crate owns the canonical in-memory graph of rooms/spaces and the
//! links between them. It grows in exactly one way: a seeded snapshot
//! followed by admitted deltas, each publish producing a new immutable
//! [`Snapshot`] value.
//!
//! # Architecture
//!
//! - [`Snapshot`] is an immutable (node set, link set) pair. Growing the
//!   graph builds a new snapshot that shares all untouched entries, so a
//!   consumer holding an old snapshot never observes mutation.
//! - [`reconcile`] holds the only dedup policy: pure admit/reject
//!   classification of one candidate against the existing collection.
//! - [`GraphStore`] applies deltas through the reconciler and multicasts
//!   every non-redundant publish to subscribers.
//! - [`projection`] gives consumer views (space filter, search, link
//!   degrees) read-only derivations over one snapshot.
//!
//! # Example
//!
//! ```no_run
//! use lattice_core::{DeltaEvent, GraphData, Link, Node};
//! use lattice_graph::GraphStore;
//!
//! let mut store = GraphStore::new();
//! store.seed(GraphData::new(vec![Node::new("!a:x", "A")], vec![]));
//!
//! let delta = DeltaEvent {
//!     node: Some(Node::new("!b:x", "B")),
//!     link: Some(Link::new("!a:x", "!b:x")),
//! };
//! assert!(store.apply(delta));
//! ```

mod projection;
mod reconcile;
mod snapshot;
mod store;

pub use projection::{search, spaces, LinkIndex};
pub use reconcile::{admit_link, admit_node, Admission};
pub use snapshot::Snapshot;
pub use store::GraphStore;
