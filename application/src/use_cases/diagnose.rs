//! Diagnose use case.
//!
//! Drives one diagnostic conversation: owns the [`Transcript`], the live
//! streaming connection, and its event receiver. User input goes out through
//! the connection; inbound events are folded into the transcript through the
//! reducer, one at a time, on a single consumer path.
//!
//! Failures never escape as panics: a connect or send failure becomes a
//! transcript error turn plus a returned error, and the caller decides
//! whether to keep the session going.

use crate::ports::diagnostic_stream::{
    DiagnosticStream, StreamConnection, StreamError, StreamHandle,
};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use detect_domain::{ConnectionState, DomainError, StreamEvent, Transcript};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while driving a diagnosis.
#[derive(Error, Debug)]
pub enum DiagnoseError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// How one assistant reply ended.
///
/// A failed reply is not fatal — the error is already recorded as a
/// transcript turn; the caller only needs to stop waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// The server delivered its authoritative final text.
    Completed(String),
    /// The server reported an error for this reply.
    Failed(String),
}

/// Use case for running a diagnostic conversation over a streaming
/// connection.
pub struct DiagnoseUseCase {
    stream: Arc<dyn DiagnosticStream>,
    logger: Arc<dyn TranscriptLogger>,
    transcript: Transcript,
    connection: Option<Arc<dyn StreamConnection>>,
    events: Option<StreamHandle>,
}

impl DiagnoseUseCase {
    pub fn new(stream: Arc<dyn DiagnosticStream>) -> Self {
        Self {
            stream,
            logger: Arc::new(NoTranscriptLogger),
            transcript: Transcript::new(),
            connection: None,
            events: None,
        }
    }

    /// Attach a transcript logger.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Seed the transcript with a stored diagnosis (resumed session).
    pub fn with_initial_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.transcript = Transcript::with_initial_diagnosis(diagnosis);
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// State of the underlying connection; `Closed` when none was opened.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map(|conn| conn.state())
            .unwrap_or(ConnectionState::Closed)
    }

    /// Open the streaming connection for `session_id`.
    ///
    /// A failure (notably a missing credential) is recorded as a transcript
    /// error turn and returned; no retry is attempted here.
    pub async fn connect(&mut self, session_id: i64) -> Result<(), StreamError> {
        match self.stream.connect(session_id).await {
            Ok(conn) => {
                // A repeated connect returns the existing connection, whose
                // event receiver was already taken — keep the one we have.
                if let Some(handle) = conn.take_events() {
                    self.events = Some(handle);
                }
                self.connection = Some(conn);
                info!(session_id, "diagnostic stream connected");
                Ok(())
            }
            Err(e) => {
                self.transcript.apply_error(&e.to_string());
                self.logger.log(TranscriptEvent::new(
                    "stream_error",
                    serde_json::json!({ "session_id": session_id, "error": e.to_string() }),
                ));
                Err(e)
            }
        }
    }

    /// Record a user turn and send it over the connection.
    ///
    /// A send failure (e.g. not yet connected) is recorded as a transcript
    /// error turn; the user turn stays in the transcript either way.
    pub async fn send_message(&mut self, text: &str) -> Result<(), DiagnoseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        let conn = self
            .connection
            .clone()
            .ok_or(DomainError::NoActiveSession)?;

        self.transcript.apply_user_message(text);
        self.logger.log(TranscriptEvent::new(
            "user_message",
            serde_json::json!({ "session_id": conn.session_id(), "text": text }),
        ));

        if let Err(e) = conn.send(text).await {
            warn!(error = %e, "send failed");
            self.transcript.apply_error(&e.to_string());
            return Err(e.into());
        }
        Ok(())
    }

    /// Consume events until the current assistant reply terminates.
    ///
    /// `on_chunk` fires for each fragment as it arrives, already folded
    /// into the transcript. Session acknowledgments are logged and skipped.
    pub async fn next_reply<F>(&mut self, mut on_chunk: F) -> Result<ReplyOutcome, StreamError>
    where
        F: FnMut(&str),
    {
        let events = self
            .events
            .as_mut()
            .ok_or_else(|| StreamError::Connection("no event stream".to_string()))?;

        loop {
            match events.recv().await {
                Some(StreamEvent::Chunk(chunk)) => {
                    self.transcript.apply_chunk(&chunk);
                    on_chunk(&chunk);
                }
                Some(StreamEvent::Complete(text)) => {
                    self.transcript.apply_complete(text.clone());
                    self.logger.log(TranscriptEvent::new(
                        "assistant_reply",
                        serde_json::json!({ "bytes": text.len(), "text": text }),
                    ));
                    return Ok(ReplyOutcome::Completed(text));
                }
                Some(StreamEvent::Error(message)) => {
                    self.transcript.apply_error(&message);
                    self.logger.log(TranscriptEvent::new(
                        "stream_error",
                        serde_json::json!({ "error": message }),
                    ));
                    return Ok(ReplyOutcome::Failed(message));
                }
                Some(StreamEvent::SessionAck(sid)) => {
                    debug!(session_id = sid, "session acknowledged");
                }
                None => {
                    return Err(StreamError::Connection("event stream ended".to_string()));
                }
            }
        }
    }

    /// Close the connection and drop the event receiver. Safe to call when
    /// nothing is open.
    pub async fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close().await;
        }
        self.events = None;
    }
}
