//! Application layer for detect-auto
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    backend_api::{ApiError, BackendApi},
    credential_store::{CredentialStore, MemoryCredentialStore},
    diagnostic_stream::{DiagnosticStream, StreamConnection, StreamError, StreamHandle},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use use_cases::diagnose::{DiagnoseError, DiagnoseUseCase, ReplyOutcome};
pub use use_cases::sessions::SessionService;
