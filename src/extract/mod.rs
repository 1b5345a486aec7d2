//! Stage 1 schema extraction
//!
//! Turns compiled provider descriptors into `ProviderSchema` IR documents:
//! the walker navigates message/field descriptors, the validation module
//! translates `buf.validate` rules, and the options module recovers the
//! OpenMCF custom extensions from raw wire bytes.

pub mod options;
pub mod validation;
pub mod walker;

pub use options::{decode_mcf_options, McfFieldOptions};
pub use walker::SchemaExtractor;
