//! Error types for CLI operations.

use odometry_node::NodeError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Node refused to start
    #[error("Failed to start odometry node: {0}")]
    NodeStartup(#[from] NodeError),

    /// Simulated rig cannot produce frames for this configuration
    #[error("Invalid simulated rig: {message}")]
    MockRig { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn mock_rig(message: impl Into<String>) -> Self {
        Self::MockRig {
            message: message.into(),
        }
    }
}
