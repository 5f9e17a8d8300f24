//! Lattice Core - Wire data model for the room graph
//!
//! This crate defines the shapes that cross the wire: room/space nodes,
//! directed links between them, the bulk snapshot payload, and the delta
//! events pushed over the live channel. It also owns delta decoding,
//! turning one raw inbound message into a typed [`DeltaEvent`].
//!
//! Everything here is plain data. The canonical graph, dedup policy, and
//! transport live in the `lattice-graph` and `lattice-sync` crates.

mod delta;
mod error;
mod link;
mod node;
mod payload;

pub use delta::DeltaEvent;
pub use error::DecodeError;
pub use link::{Link, LinkEnd};
pub use node::Node;
pub use payload::GraphData;
