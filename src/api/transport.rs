//! The HTTP transport seam
//!
//! The host client never talks to the network itself. It is handed something
//! that can issue a GET with query parameters and a POST with a JSON body, and
//! it returns whatever that thing reports.

use crate::api::types::HostQuery;
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Minimal async HTTP transport
///
/// `path` is relative to whatever base URL the implementation targets
/// (for example `/host/42`). Implementations issue exactly one request per
/// call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request with query parameters
    async fn get(&self, path: &str, query: &HostQuery) -> Result<Value, TransportError>;

    /// Perform a POST request with a JSON body
    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, path: &str, query: &HostQuery) -> Result<Value, TransportError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post(path, body).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn get(&self, path: &str, query: &HostQuery) -> Result<Value, TransportError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post(path, body).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn get(&self, path: &str, query: &HostQuery) -> Result<Value, TransportError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post(path, body).await
    }
}
