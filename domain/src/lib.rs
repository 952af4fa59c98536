//! Domain layer for detect-auto
//!
//! This crate contains the core entities of a diagnostic conversation.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! The ordered list of conversation turns for one diagnostic session.
//! Assistant output arrives as streamed chunks; the transcript folds them
//! into the currently open assistant turn and closes that turn when the
//! authoritative completion text arrives.
//!
//! ## Stream events
//!
//! [`StreamEvent`] is the bridge between the transport adapter and the
//! transcript: every inbound frame is classified into exactly one event
//! before it reaches the reducer.

pub mod core;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use core::error::DomainError;
pub use session::{
    entities::{
        CreatedSession, DiagnosticResult, PartPrediction, RepairSummary, SessionDetail,
        SessionSummary, UserProfile,
    },
    stream::{ConnectionState, StreamEvent},
};
pub use transcript::{Role, Transcript, Turn};
