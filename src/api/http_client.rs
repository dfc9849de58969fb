//! reqwest-backed transport with connection pooling
//!
//! This module provides the default [`Transport`] used by the CLI. It owns a
//! pooled `reqwest::Client`, joins request paths onto the configured base
//! URL, and unwraps the server's `{code, message, data}` envelope so callers
//! only ever see the payload or a [`TransportError`].

use crate::api::transport::Transport;
use crate::api::types::{HostQuery, ResponseEnvelope};
use crate::config::Config;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use std::time::Duration;

/// Header carrying the session token of a logged-in user
pub const AUTH_TOKEN_HEADER: &str = "Auth-Token";

/// Header carrying the shared secret agents present on register/provision
pub const REGISTER_TOKEN_HEADER: &str = "X-Register-Token";

/// Tuning for the underlying HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Overall request timeout (default: 30 seconds)
    pub timeout: Duration,
    /// Connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 60 seconds)
    pub pool_idle_timeout: Duration,
    /// Max idle connections per host (default: 5)
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(60),
            pool_max_idle_per_host: 5,
        }
    }
}

/// Create a pooled client with the given configuration
pub fn create_client(config: &HttpClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(format!("hostctl/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Transport that talks to the scheduler's web API over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    register_token: Option<String>,
    locale: Option<String>,
}

impl HttpTransport {
    /// Build a transport for `base_url` (for example `http://localhost:5920/api`)
    pub fn new(base_url: &str, config: &HttpClientConfig) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = create_client(config)?;

        Ok(Self {
            client,
            base_url,
            auth_token: None,
            register_token: None,
            locale: None,
        })
    }

    /// Build a transport from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = Self::new(&config.server.base_url, &config.http.to_client_config())?;
        Ok(transport
            .with_auth_token(config.server.auth_token.clone())
            .with_register_token(config.server.register_token.clone())
            .with_locale(config.server.locale.clone()))
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_register_token(mut self, token: Option<String>) -> Self {
        self.register_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn has_register_token(&self) -> bool {
        self.register_token.is_some()
    }

    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale.filter(|l| !l.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a request path onto the base URL
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    fn decorate(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        if let Some(token) = &self.register_token {
            builder = builder.header(REGISTER_TOKEN_HEADER, token);
        }
        if let Some(locale) = &self.locale {
            builder = builder.header(ACCEPT_LANGUAGE, locale);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, TransportError> {
        let response = self.decorate(builder).send().await?;
        read_response(response).await
    }
}

/// Turn an HTTP response into the payload the caller sees
async fn read_response(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "host API returned non-success status");
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    decode_body(&body)
}

/// Decode a 2xx body, unwrapping the `{code, message, data}` envelope
pub fn decode_body(body: &str) -> Result<Value, TransportError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| TransportError::InvalidResponse(format!("body is not JSON: {}", e)))?;

    match ResponseEnvelope::detect(&value) {
        Some(envelope) if envelope.is_success() => Ok(envelope.data),
        Some(envelope) => {
            tracing::debug!(code = envelope.code, message = %envelope.message, "host API reported failure");
            Err(TransportError::Api {
                code: envelope.code,
                message: envelope.message,
            })
        }
        None => Ok(value),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &HostQuery) -> Result<Value, TransportError> {
        let url = self.url_for(path)?;
        let mut builder = self.client.get(url);
        if !query.is_empty() {
            builder = builder.query(&query.to_pairs());
        }
        self.send(builder).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = self.url_for(path)?;
        let builder = self.client.post(url).json(body);
        self.send(builder).await
    }
}
