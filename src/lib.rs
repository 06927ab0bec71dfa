//! Atlas CLI Library
//!
//! A Rust client for the Atlas mapping-data API. Covers credential
//! lifecycle, the hierarchical command grammar, and streaming downloads of
//! map tiles and distributions.

pub mod api;
pub mod auth;
pub mod cli;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
