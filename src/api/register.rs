//! Agent enrollment endpoints
//!
//! Unlike the `/host` management calls these are authenticated with the
//! shared registration token (`X-Register-Token`) rather than a user session,
//! so they live on their own client. The transport is expected to carry the
//! token header; see [`crate::api::http_client::HttpTransport::with_register_token`].

use crate::api::transport::Transport;
use crate::api::types::{CertificateBundle, ProvisionRequest, RegisterRequest, ServerCertificateBundle};
use crate::error::TransportError;

pub const HOST_REGISTER_PATH: &str = "/host/register";
pub const HOST_PROVISION_PATH: &str = "/host/provision";

/// Client for agent self-registration and provisioning
#[derive(Debug, Clone)]
pub struct AgentClient<T> {
    transport: T,
}

impl<T: Transport> AgentClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Register an agent: `POST /host/register`
    ///
    /// Returns the client certificate when the server issued one, which it
    /// only does for requests with `needs_cert` set.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<Option<CertificateBundle>, TransportError> {
        tracing::debug!(path = HOST_REGISTER_PATH, ip = %request.ip, port = request.port, "POST host register");
        let body = serde_json::to_value(request)?;
        let data = self.transport.post(HOST_REGISTER_PATH, &body).await?;
        Ok(CertificateBundle::from_response(&data))
    }

    /// Provision a node: `POST /host/provision`
    ///
    /// The server creates the host record and answers with server-side
    /// certificate material for the agent to listen with.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<Option<ServerCertificateBundle>, TransportError> {
        tracing::debug!(path = HOST_PROVISION_PATH, ip = %request.ip, "POST host provision");
        let body = serde_json::to_value(request)?;
        let data = self.transport.post(HOST_PROVISION_PATH, &body).await?;
        Ok(ServerCertificateBundle::from_response(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::HostQuery;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    mock! {
        pub Transport {}

        #[async_trait]
        impl Transport for Transport {
            async fn get(&self, path: &str, query: &HostQuery) -> Result<Value, TransportError>;
            async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError>;
        }
    }

    fn register_request(needs_cert: bool) -> RegisterRequest {
        RegisterRequest {
            hostname: "worker-1".to_string(),
            ip: "10.0.0.7".to_string(),
            port: 5921,
            alias: "worker-1".to_string(),
            version: "1.2.0".to_string(),
            needs_cert,
        }
    }

    #[tokio::test]
    async fn test_register_returns_issued_certificate() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .with(
                eq("/host/register"),
                eq(json!({
                    "hostname": "worker-1",
                    "ip": "10.0.0.7",
                    "port": 5921,
                    "alias": "worker-1",
                    "version": "1.2.0",
                    "needs_cert": true
                })),
            )
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "cert_bundle": {"ca_cert": "CA", "client_cert": "CERT", "client_key": "KEY"}
                }))
            });
        transport.expect_get().never();

        let client = AgentClient::new(transport);
        let bundle = client.register(&register_request(true)).await.unwrap();
        assert_eq!(
            bundle,
            Some(CertificateBundle {
                ca_cert: "CA".to_string(),
                client_cert: "CERT".to_string(),
                client_key: "KEY".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_register_without_certificate() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_, _| Ok(Value::Null));

        let client = AgentClient::new(transport);
        assert_eq!(client.register(&register_request(false)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_provision_posts_hostname_and_ip() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .with(
                eq("/host/provision"),
                eq(json!({"hostname": "worker-2", "ip": "10.0.0.8"})),
            )
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "cert_bundle": {"ca_cert": "CA", "server_cert": "SCERT", "server_key": "SKEY"}
                }))
            });

        let client = AgentClient::new(transport);
        let bundle = client
            .provision(&ProvisionRequest {
                hostname: "worker-2".to_string(),
                ip: "10.0.0.8".to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bundle.server_key, "SKEY");
    }

    #[tokio::test]
    async fn test_provision_rejection_passes_through() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(1).returning(|_, _| {
            Err(TransportError::Api {
                code: 1,
                message: "Host already registered".to_string(),
            })
        });

        let client = AgentClient::new(transport);
        let err = client
            .provision(&ProvisionRequest {
                hostname: "worker-2".to_string(),
                ip: "10.0.0.8".to_string(),
            })
            .await
            .unwrap_err();
        assert_matches!(err, TransportError::Api { code: 1, ref message } if message == "Host already registered");
    }
}
