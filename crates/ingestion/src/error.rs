//! Ingestion error types

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Address is neither `host:port` nor a usable socket path
    #[error("invalid endpoint '{address}': {message}")]
    InvalidEndpoint { address: String, message: String },

    /// Host name did not resolve to any address
    #[error("could not resolve {address}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to bind the socket
    #[error("failed to bind to {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestionError {
    pub fn invalid_endpoint(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            address: address.into(),
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
