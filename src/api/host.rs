//! Host management API client
//!
//! Binds each host operation to a fixed method and path and forwards the
//! transport's result untouched. One call, one request: nothing is validated,
//! retried or cached here.

use crate::api::transport::Transport;
use crate::api::types::{HostId, HostQuery};
use crate::error::TransportError;
use serde_json::{Map, Value};

pub const HOST_LIST_PATH: &str = "/host";
pub const HOST_ALL_PATH: &str = "/host/all";
pub const HOST_STORE_PATH: &str = "/host/store";
pub const REGISTER_TOKEN_PATH: &str = "/host/register-token";
pub const REGISTER_TOKEN_GENERATE_PATH: &str = "/host/register-token/generate";

/// Stateless façade over the `/host` endpoints
#[derive(Debug, Clone)]
pub struct HostApiClient<T> {
    transport: T,
}

impl<T: Transport> HostApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Paged/filtered host listing: `GET /host?<query>`
    pub async fn list(&self, query: &HostQuery) -> Result<Value, TransportError> {
        tracing::debug!(path = HOST_LIST_PATH, params = query.len(), "GET host list");
        self.transport.get(HOST_LIST_PATH, query).await
    }

    /// Unfiltered listing: `GET /host/all`
    pub async fn all(&self) -> Result<Value, TransportError> {
        tracing::debug!(path = HOST_ALL_PATH, "GET all hosts");
        self.transport.get(HOST_ALL_PATH, &HostQuery::new()).await
    }

    /// Single host: `GET /host/{id}`
    pub async fn detail(&self, id: impl Into<HostId>) -> Result<Value, TransportError> {
        let path = detail_path(&id.into());
        tracing::debug!(path = %path, "GET host detail");
        self.transport.get(&path, &HostQuery::new()).await
    }

    /// Create or update a host: `POST /host/store`
    ///
    /// The body is sent exactly as given. Whether it creates or updates is the
    /// server's decision (a missing or zero `id` creates).
    pub async fn update(&self, data: &Value) -> Result<Value, TransportError> {
        tracing::debug!(path = HOST_STORE_PATH, "POST host store");
        self.transport.post(HOST_STORE_PATH, data).await
    }

    /// Delete a host: `POST /host/remove/{id}`
    pub async fn remove(&self, id: impl Into<HostId>) -> Result<Value, TransportError> {
        let path = remove_path(&id.into());
        tracing::debug!(path = %path, "POST host remove");
        self.transport.post(&path, &empty_body()).await
    }

    /// Liveness check of a host's agent: `GET /host/ping/{id}`
    pub async fn ping(&self, id: impl Into<HostId>) -> Result<Value, TransportError> {
        let path = ping_path(&id.into());
        tracing::debug!(path = %path, "GET host ping");
        self.transport.get(&path, &HostQuery::new()).await
    }

    /// Current agent registration token: `GET /host/register-token`
    pub async fn get_register_token(&self) -> Result<Value, TransportError> {
        tracing::debug!(path = REGISTER_TOKEN_PATH, "GET register token");
        self.transport.get(REGISTER_TOKEN_PATH, &HostQuery::new()).await
    }

    /// Rotate the registration token: `POST /host/register-token/generate`
    pub async fn generate_register_token(&self) -> Result<Value, TransportError> {
        tracing::debug!(path = REGISTER_TOKEN_GENERATE_PATH, "POST generate register token");
        self.transport
            .post(REGISTER_TOKEN_GENERATE_PATH, &empty_body())
            .await
    }
}

fn detail_path(id: &HostId) -> String {
    format!("/host/{}", id.path_segment())
}

fn remove_path(id: &HostId) -> String {
    format!("/host/remove/{}", id.path_segment())
}

fn ping_path(id: &HostId) -> String {
    format!("/host/ping/{}", id.path_segment())
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}
