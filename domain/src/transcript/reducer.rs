//! Streaming reducer over the conversation transcript.
//!
//! The transport delivers assistant output incrementally; [`Transcript`]
//! folds those events into an ordered turn list. It is a strict
//! append/replace-last transformation: turns are never reordered or removed,
//! and at most one assistant turn is "open" (still streaming) at a time.
//!
//! The open turn is tracked by an explicit index updated together with the
//! turn list, rather than by inspecting the last element, so the invariant
//! cannot drift when user and assistant turns interleave.

use crate::session::stream::StreamEvent;
use crate::transcript::entities::{Role, Turn};
use serde::{Deserialize, Serialize};

/// Ordered list of conversation turns for one diagnostic session.
///
/// Insertion order is display order. Invariant: `open_turn`, when set,
/// points at the last element, which is an assistant turn still receiving
/// chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    open_turn: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transcript from a previously produced diagnosis, shown as a
    /// closed assistant turn (e.g. when resuming a stored session).
    pub fn with_initial_diagnosis(diagnosis: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::assistant(diagnosis)],
            open_turn: None,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// True while an assistant turn is still receiving chunks.
    pub fn has_open_turn(&self) -> bool {
        self.open_turn.is_some()
    }

    /// Append a fragment of in-progress assistant output.
    ///
    /// Extends the open assistant turn when one exists; otherwise opens a
    /// new assistant turn. Chunks are concatenated strictly in arrival
    /// order, with no reordering or deduplication.
    pub fn apply_chunk(&mut self, text: &str) {
        match self.open_turn {
            Some(idx) => self.turns[idx].content.push_str(text),
            None => {
                self.turns.push(Turn::assistant(text));
                self.open_turn = Some(self.turns.len() - 1);
            }
        }
    }

    /// Record the authoritative final text for the current assistant turn.
    ///
    /// The completion payload replaces the accumulated chunk content
    /// wholesale — the server's final text may differ from the chunk
    /// concatenation, and it wins. Closes the open turn; if no turn is
    /// open, appends a new already-closed assistant turn.
    pub fn apply_complete(&mut self, final_text: impl Into<String>) {
        match self.open_turn.take() {
            Some(idx) => self.turns[idx].content = final_text.into(),
            None => self.turns.push(Turn::assistant(final_text)),
        }
    }

    /// Append a user turn. Never merges with a preceding turn, regardless
    /// of its role.
    pub fn apply_user_message(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    /// Append an error as a closed assistant turn (`"Error: " + message`).
    ///
    /// Any open turn is closed first with the content it has so far, so a
    /// chunk arriving after the error starts a fresh turn instead of
    /// extending the interrupted one.
    pub fn apply_error(&mut self, message: &str) {
        self.open_turn = None;
        self.turns.push(Turn::assistant(format!("Error: {}", message)));
    }

    /// Fold a transport event into the transcript.
    ///
    /// Session acknowledgments carry no conversational content and leave
    /// the transcript untouched.
    pub fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Chunk(text) => self.apply_chunk(text),
            StreamEvent::Complete(text) => self.apply_complete(text.clone()),
            StreamEvent::Error(message) => self.apply_error(message),
            StreamEvent::SessionAck(_) => {}
        }
    }

    /// Role of the open turn, if any. Always [`Role::Assistant`] by
    /// construction; exposed for debug assertions.
    pub fn open_role(&self) -> Option<Role> {
        self.open_turn.map(|idx| self.turns[idx].role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_accumulate_into_single_open_assistant_turn() {
        let mut transcript = Transcript::new();
        transcript.apply_chunk("The ");
        transcript.apply_chunk("knock ");
        transcript.apply_chunk("is bad.");

        assert_eq!(transcript.len(), 1);
        let turn = transcript.last().unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "The knock is bad.");
        assert!(transcript.has_open_turn());
    }

    #[test]
    fn complete_replaces_accumulated_chunks_wholesale() {
        let mut transcript = Transcript::new();
        transcript.apply_chunk("abc");
        transcript.apply_complete("The knocking is likely a bearing issue.");

        assert_eq!(transcript.len(), 1);
        assert_eq!(
            transcript.last().unwrap().content,
            "The knocking is likely a bearing issue."
        );
        assert!(!transcript.has_open_turn());
    }

    #[test]
    fn complete_without_open_turn_appends_closed_turn() {
        let mut transcript = Transcript::new();
        transcript.apply_user_message("engine knocking");
        transcript.apply_complete("Likely a bearing.");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().role, Role::Assistant);
        assert!(!transcript.has_open_turn());
    }

    #[test]
    fn user_messages_never_merge() {
        let mut transcript = Transcript::new();
        transcript.apply_user_message("a");
        transcript.apply_user_message("b");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].content, "a");
        assert_eq!(transcript.turns()[1].content, "b");
    }

    #[test]
    fn chunk_after_user_message_opens_new_assistant_turn() {
        let mut transcript = Transcript::new();
        transcript.apply_chunk("partial");
        transcript.apply_complete("done");
        transcript.apply_user_message("follow-up");
        transcript.apply_chunk("second answer");

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().unwrap().content, "second answer");
        assert!(transcript.has_open_turn());
    }

    #[test]
    fn error_appends_exactly_one_turn_with_prefix() {
        let mut transcript = Transcript::new();
        transcript.apply_user_message("hi");
        let before = transcript.len();
        transcript.apply_error("boom");

        assert_eq!(transcript.len(), before + 1);
        assert_eq!(transcript.last().unwrap().content, "Error: boom");
        assert_eq!(transcript.last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn error_closes_the_open_turn() {
        let mut transcript = Transcript::new();
        transcript.apply_chunk("half an ans");
        assert!(transcript.has_open_turn());

        transcript.apply_error("connection lost");
        assert!(!transcript.has_open_turn());
        assert_eq!(transcript.len(), 2);
        // The interrupted turn keeps what it had; the error is a sibling.
        assert_eq!(transcript.turns()[0].content, "half an ans");

        // A later chunk starts a fresh turn rather than resurrecting the
        // interrupted one.
        transcript.apply_chunk("retry");
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().unwrap().content, "retry");
    }

    #[test]
    fn apply_folds_events_and_ignores_acks() {
        let mut transcript = Transcript::new();
        transcript.apply(&StreamEvent::SessionAck(7));
        assert!(transcript.is_empty());

        transcript.apply(&StreamEvent::Chunk("The ".into()));
        transcript.apply(&StreamEvent::Chunk("knock".into()));
        transcript.apply(&StreamEvent::Complete("Final text.".into()));

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.last().unwrap().content, "Final text.");
    }

    #[test]
    fn initial_diagnosis_starts_closed() {
        let transcript = Transcript::with_initial_diagnosis("Worn brake pads.");
        assert_eq!(transcript.len(), 1);
        assert!(!transcript.has_open_turn());
        assert_eq!(transcript.open_role(), None);
    }
}
