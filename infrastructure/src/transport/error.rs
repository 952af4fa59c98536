//! Error types for the WebSocket transport

use detect_application::StreamError;
use detect_domain::ConnectionState;
use thiserror::Error;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur on the diagnostic streaming connection
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("No authentication token found")]
    MissingCredential,

    #[error("Connection not ready (state: {0})")]
    NotReady(ConnectionState),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TransportError> for StreamError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::MissingCredential => StreamError::MissingCredential,
            TransportError::NotReady(state) => StreamError::NotReady(state),
            TransportError::WebSocket(e) => StreamError::Connection(e.to_string()),
            TransportError::InvalidEndpoint(e) => StreamError::Connection(e.to_string()),
            TransportError::Serialization(e) => StreamError::Connection(e.to_string()),
        }
    }
}
