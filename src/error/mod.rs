//! Error handling module for the codegen pipeline
//!
//! This module provides the error types shared by both pipeline stages.

mod error;

// Re-export the main error types and utilities
pub use error::{CodegenError, Result};
