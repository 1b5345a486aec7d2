//! OpenMCF schema code-generation pipeline
//!
//! Two offline stages turn OpenMCF provider Protocol Buffer definitions
//! into input validation code for the MCP gateway:
//!
//! - Stage 1 (`proto2schema`) walks a compiled descriptor image and writes
//!   one JSON schema per provider kind plus a registry indexing them.
//! - Stage 2 (`generator`) reads that schema tree back and emits per-cloud
//!   Rust modules of input parsers with a kind dispatch table.

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod generate;
pub mod output;
pub mod schema;
pub mod utils;

pub use error::{CodegenError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Conventional descriptor image file name inside the openmcf/apis directory.
pub const DESCRIPTOR_IMAGE_FILE: &str = "descriptor.binpb";
