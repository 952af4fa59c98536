//! Conversation transcript: turns and the streaming reducer.

pub mod entities;
pub mod reducer;

pub use entities::{Role, Turn};
pub use reducer::Transcript;
