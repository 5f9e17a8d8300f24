//! Delta event decoding.
//!
//! Each push message carries at most one candidate node and one candidate
//! link. The message shape always presents both fields, but either may be
//! null; an absent candidate decodes to `None`, never to an empty
//! placeholder.

use crate::error::DecodeError;
use crate::link::Link;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// One incremental update decoded from a push message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeltaEvent {
    /// Candidate node, if the message carried one.
    #[serde(default)]
    pub node: Option<Node>,

    /// Candidate link, if the message carried one.
    #[serde(default)]
    pub link: Option<Link>,
}

impl DeltaEvent {
    /// Decodes one raw inbound message.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError`] when the payload is not a JSON object of
    /// the expected shape. Malformed messages are dropped by the caller;
    /// they never terminate the channel.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let event = serde_json::from_str(raw)?;
        Ok(event)
    }

    /// True if the message carried neither a node nor a link.
    pub fn is_empty(&self) -> bool {
        self.node.is_none() && self.link.is_none()
    }
}
