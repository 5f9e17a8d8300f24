//! One-shot bulk snapshot fetch.

use crate::error::SyncError;
use lattice_core::GraphData;
use reqwest::header::CONTENT_TYPE;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Fetches the full graph exactly once to seed the store.
///
/// The request guard makes repeated or concurrent invocations harmless:
/// only the first call issues a request; later callers observe the guard
/// and get `None`. A failed fetch keeps the guard set and is fatal to
/// initialization; there is no retry because no graph can be shown
/// without the snapshot anyway.
pub struct BulkLoader {
    client: reqwest::Client,
    url: String,
    requested: AtomicBool,
}

impl BulkLoader {
    /// Creates a loader for the given snapshot resource.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            requested: AtomicBool::new(false),
        }
    }

    /// True once a fetch has been issued (successfully or not).
    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Fetches the full graph, or returns `Ok(None)` if a fetch was
    /// already issued by an earlier call.
    ///
    /// # Errors
    ///
    /// Fails with [`SyncError::Fetch`] on transport trouble or a
    /// non-success status, and [`SyncError::Payload`] when the body does
    /// not parse as a graph.
    pub async fn load(&self) -> Result<Option<GraphData>, SyncError> {
        if self.requested.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }

        info!("requesting bulk snapshot from {}", self.url);

        let body = self
            .client
            .get(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let data: GraphData = serde_json::from_str(&body)?;
        info!(
            "bulk snapshot received: {} nodes, {} links",
            data.nodes.len(),
            data.links.len()
        );

        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_load_is_guarded() {
        // Nothing listens on this port; the first call errors but still
        // consumes the one permitted request.
        let loader = BulkLoader::new("http://127.0.0.1:1/relations");

        assert!(!loader.requested());
        assert!(loader.load().await.is_err());
        assert!(loader.requested());

        // The guard, not the network, answers from here on.
        assert!(matches!(loader.load().await, Ok(None)));
    }
}
