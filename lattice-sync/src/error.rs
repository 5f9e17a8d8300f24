//! Sync error taxonomy.

use thiserror::Error;

/// Errors surfaced by the sync layer.
///
/// Only initialization can fail loudly: without the bulk snapshot there is
/// no graph to show. Push-channel trouble is handled inside the connection
/// manager and never reaches consumers as an error.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The one-shot bulk fetch failed (transport or HTTP status).
    #[error("bulk snapshot fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The bulk fetch succeeded but the body was not a graph payload.
    #[error("bulk snapshot returned malformed data: {0}")]
    Payload(#[from] serde_json::Error),
}
