//! Infrastructure layer for detect-auto
//!
//! Adapters for the Detect Auto backend: the WebSocket streaming transport,
//! the REST client, credential storage, configuration, and the JSONL
//! transcript logger.

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod transport;

// Re-export main adapters
pub use api::client::HttpBackendApi;
pub use auth::token_store::FileCredentialStore;
pub use config::file_config::FileConfig;
pub use config::loader::ConfigLoader;
pub use logging::jsonl_logger::JsonlTranscriptLogger;
pub use transport::stream::WsDiagnosticStream;
