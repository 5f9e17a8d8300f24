//! Lattice Sync - transport and the incremental sync engine
//!
//! This crate connects the canonical graph to the outside world:
//!
//! - [`BulkLoader`] performs the guarded one-shot snapshot fetch that
//!   seeds the store before any delta is processed.
//! - [`ConnectionManager`] owns the push-channel lifecycle: connect,
//!   detect closure, reconnect forever at a fixed interval, and expose a
//!   multicast tap on inbound messages.
//! - [`SyncEngine`] wires the two together: seed, then connect, then
//!   decode and apply each delta in arrival order.
//!
//! Transport failures are never surfaced to graph consumers as errors;
//! they only pause the delta stream until the channel comes back.

mod connection;
mod engine;
mod error;
mod loader;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use engine::{EngineConfig, GraphHandle, SharedStore, SyncEngine};
pub use error::SyncError;
pub use loader::BulkLoader;
