//! Application use cases

pub mod diagnose;
pub mod sessions;
