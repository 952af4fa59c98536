//! Diagnostic session entities and stream events

pub mod entities;
pub mod stream;
