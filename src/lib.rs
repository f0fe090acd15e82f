//! ESGF Request Library
//!
//! Reconciles ESGF search results against a local checksum inventory and
//! writes request manifests for data that is missing or out of date.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
