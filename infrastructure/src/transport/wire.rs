//! Wire format for the diagnostic streaming channel.
//!
//! Inbound frames are single JSON objects, one per text message. Exactly
//! four shapes exist; anything else is malformed and surfaces as a fixed
//! error event so raw server text never leaks into the transcript.

use detect_domain::StreamEvent;
use serde::{Deserialize, Serialize};

/// Error text shown for frames that do not decode.
pub const MALFORMED_PAYLOAD: &str = "Invalid message format";

/// Outbound frame carrying one user message.
#[derive(Debug, Serialize)]
struct InputFrame<'a> {
    input: &'a str,
}

/// Inbound frame shapes, tried in declaration order. `Complete` comes
/// first because its frames also carry a `result` field that must not be
/// mistaken for anything else.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InboundFrame {
    Complete { complete: bool, result: String },
    Chunk { chunk: String },
    Error { error: String },
    SessionAck { session_id: i64 },
}

/// Encode one user message as a text frame.
pub fn encode_input(text: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&InputFrame { input: text })
}

/// Classify one inbound text frame into a stream event.
///
/// Total: malformed payloads become an error event with [`MALFORMED_PAYLOAD`]
/// as the message, never a decode failure.
pub fn classify_frame(raw: &str) -> StreamEvent {
    match serde_json::from_str::<InboundFrame>(raw) {
        Ok(InboundFrame::Complete { complete: true, result }) => StreamEvent::Complete(result),
        Ok(InboundFrame::Complete { complete: false, .. }) => {
            StreamEvent::Error(MALFORMED_PAYLOAD.to_string())
        }
        Ok(InboundFrame::Chunk { chunk }) => StreamEvent::Chunk(chunk),
        Ok(InboundFrame::Error { error }) => StreamEvent::Error(error),
        Ok(InboundFrame::SessionAck { session_id }) => StreamEvent::SessionAck(session_id),
        Err(_) => StreamEvent::Error(MALFORMED_PAYLOAD.to_string()),
    }
}
