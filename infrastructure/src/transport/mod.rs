//! WebSocket transport for the diagnostic streaming channel.
//!
//! One connection per diagnostic session, opened against
//! `{ws_base}/ws/diagnostics/{session_id}?token={bearer}`.
//!
//! - [`wire`] — frame classification (inbound) and encoding (outbound).
//! - [`connection`] — a single live connection: state machine, background
//!   reader task, send/close.
//! - [`stream`] — the [`DiagnosticStream`](detect_application::DiagnosticStream)
//!   adapter owning at most one live connection.

pub mod connection;
pub mod error;
pub mod stream;
pub mod wire;

pub use error::{Result, TransportError};
