// Library exports for hostctl components

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use api::host::HostApiClient;
pub use api::http_client::{HttpClientConfig, HttpTransport};
pub use api::register::AgentClient;
pub use api::transport::Transport;
pub use api::types::{
    CertificateBundle, HostId, HostQuery, HostRecord, ProvisionRequest, QueryValue, RegisterRequest,
    RegisterToken, ResponseEnvelope, ServerCertificateBundle,
};
pub use config::Config;
pub use error::{ConfigError, TransportError};
