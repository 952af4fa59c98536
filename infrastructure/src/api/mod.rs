//! REST client for the Detect Auto backend

pub mod client;

pub use client::HttpBackendApi;
