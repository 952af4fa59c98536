//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("No active diagnostic session")]
    NoActiveSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_display() {
        assert_eq!(DomainError::EmptyMessage.to_string(), "Message is empty");
    }

    #[test]
    fn no_active_session_display() {
        assert_eq!(
            DomainError::NoActiveSession.to_string(),
            "No active diagnostic session"
        );
    }
}
