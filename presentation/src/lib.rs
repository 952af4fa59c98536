//! Presentation layer for detect-auto
//!
//! This crate contains the interactive chat REPL, console output
//! formatters, and the streaming progress indicator.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command};
pub use output::formatter::ConsoleFormatter;
pub use progress::reporter::StreamProgress;
