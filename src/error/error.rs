//! Error types and handling for the codegen pipeline

use thiserror::Error;

/// Result type alias for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Main error type for the codegen pipeline
#[derive(Error, Debug)]
pub enum CodegenError {
    /// Configuration errors (CLI arguments, missing directories)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Descriptor image errors (missing files, unresolvable types)
    #[error("Descriptor error: {message}")]
    Descriptor { message: String },

    /// Schema extraction errors (missing API/Spec messages, bad constants)
    #[error("Extraction error: {message}")]
    Extract { message: String },

    /// Stage 2 generation errors
    #[error("Generation error: {message}")]
    Generate { message: String },

    /// Descriptor wire decoding errors
    #[error("Descriptor decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CodegenError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a descriptor error
    pub fn descriptor<S: Into<String>>(message: S) -> Self {
        Self::Descriptor {
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extract<S: Into<String>>(message: S) -> Self {
        Self::Extract {
            message: message.into(),
        }
    }

    /// Create a generation error
    pub fn generate<S: Into<String>>(message: S) -> Self {
        Self::Generate {
            message: message.into(),
        }
    }
}
