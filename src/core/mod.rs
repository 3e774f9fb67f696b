//! Core building blocks shared by every command
//!
//! - **config**: impact.toml parsing and validation
//! - **context**: per-invocation context (config + topology snapshot)
//! - **error**: error types with contextual help messages and exit codes

pub mod config;
pub mod context;
pub mod error;
