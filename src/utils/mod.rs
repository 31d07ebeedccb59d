// src/utils/mod.rs
//! Shared utilities
//!
//! - **config**: Layered configuration (defaults → file → environment)
//! - **errors**: Crate-wide error type

pub mod config;
pub mod errors;

pub use config::{AppConfig, RecorderConfig, TransformConfig};
pub use errors::{RecorderError, Result};
