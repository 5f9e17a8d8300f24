//! Decode error taxonomy.

use thiserror::Error;

/// Errors produced while decoding inbound payloads.
///
/// A decode failure is isolated to the offending message: the caller logs
/// it and keeps reading the channel.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed delta payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
