//! Console output formatting

pub mod formatter;

pub use formatter::ConsoleFormatter;
