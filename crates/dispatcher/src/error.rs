//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Handler creation error
    #[error("failed to create handler '{name}': {message}")]
    HandlerCreation { name: String, message: String },

    /// Sink error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a handler creation error
    pub fn handler_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
