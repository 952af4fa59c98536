//! Diagnostic stream port
//!
//! Defines the interface for the per-session streaming channel that carries
//! incremental assistant output. The adapter (WebSocket transport) lives in
//! the infrastructure layer.

use async_trait::async_trait;
use detect_domain::{ConnectionState, StreamEvent};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur on the diagnostic stream.
///
/// All failures surface either through this type or as a transcript entry;
/// raw transport errors never cross the port boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    /// No bearer token could be resolved. Fatal for the attempted connect;
    /// never retried silently, and no network operation is performed.
    #[error("No authentication token found")]
    MissingCredential,

    /// `send` was attempted while the connection was not in the connected
    /// state. Non-fatal; the caller may retry once connected.
    #[error("Connection not ready (state: {0})")]
    NotReady(ConnectionState),

    /// The server reported an error inside a message. The connection may
    /// remain open.
    #[error("{0}")]
    Remote(String),

    /// The connection closed with a non-normal close code.
    #[error("Connection closed unexpectedly: {0}")]
    AbnormalClose(String),

    /// Connection-level failure (handshake, socket I/O, stream ended).
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Handle for receiving events from one streaming connection.
///
/// Wraps the single serialized event path of the connection: every inbound
/// frame arrives here in order, and the reducer is never invoked from more
/// than one place.
pub struct StreamHandle {
    pub receiver: mpsc::UnboundedReceiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::UnboundedReceiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, or `None` once the connection has closed
    /// and drained.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream until the current reply terminates, collecting
    /// text. The completion payload wins over accumulated chunks.
    pub async fn collect_text(mut self) -> Result<String, StreamError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Chunk(chunk) => full_text.push_str(&chunk),
                StreamEvent::Complete(text) => return Ok(text),
                StreamEvent::Error(e) => return Err(StreamError::Remote(e)),
                StreamEvent::SessionAck(_) => {}
            }
        }
        // Channel closed without a terminal event — return what we have
        Ok(full_text)
    }
}

/// One live streaming connection.
#[async_trait]
pub trait StreamConnection: Send + Sync {
    /// Session this connection is bound to.
    fn session_id(&self) -> i64;

    /// Current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Send one user input frame. Degrades to [`StreamError::NotReady`]
    /// when the connection is not connected; never panics or blocks.
    async fn send(&self, text: &str) -> Result<(), StreamError>;

    /// Take the event receiver. Yields `Some` exactly once; the stream has
    /// a single consumer.
    fn take_events(&self) -> Option<StreamHandle>;

    /// Close the connection. Idempotent; no event is delivered after the
    /// first close returns.
    async fn close(&self);
}

impl std::fmt::Debug for dyn StreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConnection")
            .field("session_id", &self.session_id())
            .field("state", &self.state())
            .finish()
    }
}

/// Factory port for opening session-scoped streaming connections.
///
/// Implementations own at most one live connection: a second `connect`
/// while one is pending or live returns the existing handle (with a warn
/// log) instead of silently ignoring the request.
#[async_trait]
pub trait DiagnosticStream: Send + Sync {
    async fn connect(&self, session_id: i64) -> Result<Arc<dyn StreamConnection>, StreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_prefers_completion_payload() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("The ".into())).unwrap();
        tx.send(StreamEvent::Chunk("knock".into())).unwrap();
        tx.send(StreamEvent::Complete("Authoritative final.".into()))
            .unwrap();
        drop(tx);

        let handle = StreamHandle::new(rx);
        assert_eq!(handle.collect_text().await.unwrap(), "Authoritative final.");
    }

    #[tokio::test]
    async fn collect_text_surfaces_remote_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Error("model unavailable".into()))
            .unwrap();
        drop(tx);

        let handle = StreamHandle::new(rx);
        assert_eq!(
            handle.collect_text().await,
            Err(StreamError::Remote("model unavailable".into()))
        );
    }

    #[tokio::test]
    async fn collect_text_returns_partial_when_channel_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("half".into())).unwrap();
        drop(tx);

        let handle = StreamHandle::new(rx);
        assert_eq!(handle.collect_text().await.unwrap(), "half");
    }
}
