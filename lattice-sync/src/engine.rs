//! The sync engine: bulk seed, then live deltas.
//!
//! Ordering is the point of this module. The engine seeds the store from
//! the bulk snapshot and only then opens the push channel, so no delta is
//! ever classified against an empty baseline. Deltas are applied strictly
//! in arrival order by a single pump task; a malformed message is logged
//! and dropped without disturbing the stream.

use crate::connection::{ConnectionConfig, ConnectionManager};
use crate::error::SyncError;
use crate::loader::BulkLoader;
use lattice_core::DeltaEvent;
use lattice_graph::{GraphStore, Snapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Shared handle on the canonical store.
pub type SharedStore = Arc<RwLock<GraphStore>>;

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bulk snapshot resource, e.g. `https://host/relations`.
    pub snapshot_url: String,

    /// Push channel endpoint, e.g. `wss://host/ws`.
    pub channel_url: String,

    /// Fixed reconnect delay for the push channel.
    pub reconnect_delay: Duration,
}

impl EngineConfig {
    /// Creates a config with the default reconnect delay.
    pub fn new(snapshot_url: impl Into<String>, channel_url: impl Into<String>) -> Self {
        let channel = ConnectionConfig::new(channel_url);
        Self {
            snapshot_url: snapshot_url.into(),
            channel_url: channel.url,
            reconnect_delay: channel.reconnect_delay,
        }
    }
}

/// Owns the store, the loader, and the push channel.
pub struct SyncEngine {
    store: SharedStore,
    loader: BulkLoader,
    connection: ConnectionManager,
    pump: Option<JoinHandle<()>>,
}

impl SyncEngine {
    /// Creates an engine. Nothing happens until [`start`].
    ///
    /// [`start`]: SyncEngine::start
    pub fn new(config: EngineConfig) -> Self {
        let connection = ConnectionManager::new(ConnectionConfig {
            url: config.channel_url,
            reconnect_delay: config.reconnect_delay,
        });

        Self {
            store: Arc::new(RwLock::new(GraphStore::new())),
            loader: BulkLoader::new(config.snapshot_url),
            connection,
            pump: None,
        }
    }

    /// Seeds the store from the bulk snapshot, then opens the push channel
    /// and starts applying deltas.
    ///
    /// A second call is a no-op: the loader's request guard has already
    /// been consumed.
    ///
    /// # Errors
    ///
    /// Fails with [`SyncError`] when the bulk fetch fails; this is fatal,
    /// no graph exists to display without it.
    pub async fn start(&mut self) -> Result<(), SyncError> {
        let Some(data) = self.loader.load().await? else {
            debug!("start() after the snapshot was already requested is a no-op");
            return Ok(());
        };

        {
            let mut store = self.store.write().await;
            store.seed(data);
        }

        // Tap the channel before opening it so the first frame cannot slip
        // past the pump.
        let messages = self.connection.subscribe();
        self.connection.connect();

        let store = Arc::clone(&self.store);
        self.pump = Some(tokio::spawn(pump_deltas(messages, store)));

        Ok(())
    }

    /// A cloneable consumer handle onto the synchronized graph.
    pub fn handle(&self) -> GraphHandle {
        GraphHandle {
            store: Arc::clone(&self.store),
        }
    }

    /// The shared store itself, for callers that need direct access.
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    /// The connection manager, for lifecycle control and the raw tap.
    pub fn connection(&mut self) -> &mut ConnectionManager {
        &mut self.connection
    }

    /// Stops the delta stream. Snapshots already published stay valid;
    /// consumers simply receive no further notifications.
    pub fn shutdown(&mut self) {
        self.connection.close();
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Applies inbound frames to the store, in arrival order, forever.
async fn pump_deltas(mut messages: broadcast::Receiver<String>, store: SharedStore) {
    loop {
        match messages.recv().await {
            Ok(raw) => match DeltaEvent::decode(&raw) {
                Ok(delta) => {
                    let mut store = store.write().await;
                    if store.apply(delta) {
                        debug!("applied delta");
                    }
                }
                // Malformed messages are dropped; the channel lives on.
                Err(e) => warn!("dropping inbound message: {}", e),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("delta tap lagged, skipped {} messages", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// The consumer contract: synchronous-style access to the current graph
/// plus a subscription for future snapshots.
///
/// Every view uses this identically; per-view filtering happens read-only
/// over the snapshots (see `lattice_graph::projection`).
#[derive(Clone)]
pub struct GraphHandle {
    store: SharedStore,
}

impl GraphHandle {
    /// The latest published snapshot, or `None` before the seed.
    pub async fn current(&self) -> Option<Snapshot> {
        self.store.read().await.current()
    }

    /// True once a graph is available.
    pub async fn is_loaded(&self) -> bool {
        self.store.read().await.is_loaded()
    }

    /// Subscribes to future snapshot publishes. Dropping the receiver
    /// unsubscribes.
    pub async fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.store.read().await.subscribe()
    }

    /// Reads the current snapshot and subscribes in one step, under one
    /// lock. A publish can land before or after this call, but never
    /// between the read and the subscription, so a consumer that starts
    /// from the returned snapshot misses nothing.
    pub async fn current_and_subscribe(
        &self,
    ) -> (Option<Snapshot>, broadcast::Receiver<Snapshot>) {
        let store = self.store.read().await;
        (store.current(), store.subscribe())
    }
}
