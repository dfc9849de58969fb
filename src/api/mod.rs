//! API-related modules for hostctl
//!
//! # Module Structure
//!
//! - `host` - Host management client, one method per endpoint
//! - `register` - Agent registration and provisioning, authenticated by token
//! - `transport` - The injected HTTP transport seam
//! - `http_client` - reqwest-backed transport with connection pooling
//! - `types` - Query, id, record and token descriptors

pub mod host;
pub mod http_client;
pub mod register;
pub mod transport;
pub mod types;
