//! Interactive diagnostic chat

pub mod repl;

pub use repl::ChatRepl;
