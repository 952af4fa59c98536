//! Port definitions (interfaces to infrastructure)

pub mod backend_api;
pub mod credential_store;
pub mod diagnostic_stream;
pub mod transcript_logger;
