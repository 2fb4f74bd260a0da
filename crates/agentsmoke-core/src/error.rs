//! Error types for AgentSmoke

use std::time::Duration;

use thiserror::Error;

/// Result type alias using AgentSmoke's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for AgentSmoke operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport error talking to the backend or the application
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Unexpected HTTP status from the backend or the application
    #[error("Unexpected status calling {url}: {status}")]
    Status {
        /// Request URL
        url: String,
        /// Status code returned by the server
        status: reqwest::StatusCode,
    },

    /// A trace export blob failed to decode
    #[error("Failed to decode trace export at index {index}: {source}")]
    Decode {
        /// Position of the failing blob within the batch
        index: usize,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// No non-empty trace batch was observed within the deadline
    #[error("Timed out waiting for traces after {waited:?}")]
    Timeout {
        /// How long the poller waited before giving up
        waited: Duration,
    },

    /// Malformed Kubernetes manifest
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),

    /// Provisioning failure (namespace, apply, readiness)
    #[error("Provisioning error: {0}")]
    Provision(String),

    /// Unexpected response body from the application under test
    #[error("Unexpected greeting response: {0:?}")]
    Greeting(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error outside of batch decoding
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a decode error for the blob at `index`
    pub fn decode(index: usize, source: serde_json::Error) -> Self {
        Self::Decode { index, source }
    }

    /// Create a provisioning error
    pub fn provision(msg: impl Into<String>) -> Self {
        Self::Provision(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True if this failure came from the HTTP layer (network or status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}
