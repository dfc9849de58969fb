//! Centralized error handling for hostctl
//!
//! The library surfaces a single error type, [`TransportError`], which the
//! host client hands back to callers exactly as the transport produced it.
//! Configuration has its own [`ConfigError`]. The binary works in `anyhow`
//! and adds context through [`ResultExt`].

use thiserror::Error;

/// Failures reported by a transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection or protocol failure below HTTP
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Server answered with a non-2xx status
    #[error("Server error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Server answered 2xx but the envelope carried a failure code
    #[error("API error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// Response body could not be understood
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Base URL and path did not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// Rejected credentials: HTTP 401/403 or the envelope's auth code
    pub fn is_auth_error(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => *status == 401 || *status == 403,
            TransportError::Api { code, .. } => *code == crate::api::types::codes::AUTH_ERROR,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err)
        }
    }
}

/// Configuration load/save failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for the binary
pub type HostctlResult<T> = anyhow::Result<T>;

/// Extension trait for adding hostctl-specific context to errors
pub trait ResultExt<T> {
    /// Add API operation context to an error
    fn with_api_context(self, operation: &str) -> HostctlResult<T>;

    /// Add file operation context to an error
    fn with_file_context(self, path: &str) -> HostctlResult<T>;

    /// Add configuration context to an error
    fn with_config_context(self, setting: &str) -> HostctlResult<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for Result<T, E> {
    fn with_api_context(self, operation: &str) -> HostctlResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("API operation failed: {}", operation))
    }

    fn with_file_context(self, path: &str) -> HostctlResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("File operation failed: {}", path))
    }

    fn with_config_context(self, setting: &str) -> HostctlResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Configuration error for: {}", setting))
    }
}
