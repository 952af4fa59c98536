//! Streaming events for the diagnostic channel.
//!
//! [`StreamEvent`] represents individual events on the per-session streaming
//! connection, enabling real-time display of assistant output as it is
//! generated. Every inbound frame is classified into exactly one variant
//! before it reaches the transcript reducer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An event on the diagnostic stream.
///
/// Used to bridge transport-level frames (WebSocket messages from the
/// backend) to the application layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// A fragment of in-progress assistant output.
    Chunk(String),
    /// The authoritative final text for the current assistant turn.
    ///
    /// Replaces accumulated chunk content wholesale; the two are not
    /// guaranteed to concatenate cleanly.
    Complete(String),
    /// A server-reported or transport-level error. Does not necessarily
    /// end the connection.
    Error(String),
    /// Acknowledgment carrying the session id the server bound this
    /// connection to. Informational only.
    SessionAck(i64),
}

impl StreamEvent {
    /// Returns the text content if this is a Chunk or Complete event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Chunk(s) | StreamEvent::Complete(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the current assistant reply.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete(_) | StreamEvent::Error(_))
    }
}

/// State of the single streaming connection for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Error,
    Closed,
}

impl ConnectionState {
    /// True while the connection is usable or about to become usable.
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}
