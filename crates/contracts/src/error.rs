//! Layered error definitions
//!
//! Categorized by source: config / engine / general. Frame assembly and
//! topology errors live in their own crates and wrap this one where needed.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Odometry Engine Errors =====
    /// Engine rejected its configuration
    #[error("odometry engine '{engine}' configuration error: {message}")]
    EngineConfig { engine: String, message: String },

    /// Engine failed to process a frame
    #[error("odometry engine '{engine}' failed on frame {sequence}: {message}")]
    EngineProcess {
        engine: String,
        sequence: u64,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create engine processing error
    pub fn engine_process(engine: impl Into<String>, sequence: u64, message: impl Into<String>) -> Self {
        Self::EngineProcess {
            engine: engine.into(),
            sequence,
            message: message.into(),
        }
    }
}
