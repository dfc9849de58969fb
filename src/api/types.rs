//! Request and response descriptors for the host endpoints
//!
//! None of these types are validated client-side. The server owns the shape of
//! a host record; the client only knows enough to build a request and to read
//! back a handful of well-known fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A single primitive query parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Bool(v) => write!(f, "{}", v),
            QueryValue::Int(v) => write!(f, "{}", v),
            QueryValue::Float(v) => write!(f, "{}", v),
            QueryValue::Text(v) => f.write_str(v),
        }
    }
}

impl QueryValue {
    /// Type a raw command-line value
    ///
    /// Only values whose rendering reproduces the input exactly become
    /// integers or booleans, so `007` or `+5` stay text.
    pub fn parse(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            if n.to_string() == raw {
                return QueryValue::Int(n);
            }
        }
        match raw {
            "true" => QueryValue::Bool(true),
            "false" => QueryValue::Bool(false),
            _ => QueryValue::Text(raw.to_string()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value as i64)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value as i64)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

/// Flat filter parameters for a host listing
///
/// Keys are kept sorted so the same query always serializes to the same
/// query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostQuery(BTreeMap<String, QueryValue>);

impl HostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Key/value pairs in key order, rendered as strings for the query string
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    /// Parse a `key=value` argument as given on the command line
    pub fn parse_pair(arg: &str) -> Option<(String, QueryValue)> {
        let (key, raw) = arg.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), QueryValue::parse(raw)))
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for HostQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = HostQuery::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}

/// Identifier of a host, interpolated into a single path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as it appears in a request path
    ///
    /// Inserted verbatim: callers pass ids that are already URL-safe,
    /// percent-escapes included.
    pub fn path_segment(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(value: &str) -> Self {
        HostId(value.to_string())
    }
}

impl From<String> for HostId {
    fn from(value: String) -> Self {
        HostId(value)
    }
}

impl From<i64> for HostId {
    fn from(value: i64) -> Self {
        HostId(value.to_string())
    }
}

impl From<i32> for HostId {
    fn from(value: i32) -> Self {
        HostId(value.to_string())
    }
}

impl From<u64> for HostId {
    fn from(value: u64) -> Self {
        HostId(value.to_string())
    }
}

/// Opaque host payload as exchanged with the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostRecord(Map<String, Value>);

impl HostRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Wrap a JSON value; only objects are host records
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(HostRecord(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    /// Name is the host address (IP or hostname) the scheduler dials
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The server treats a missing or zero id as a create
    pub fn is_new(&self) -> bool {
        self.id().map_or(true, |id| id == 0)
    }
}

impl From<HostRecord> for Value {
    fn from(record: HostRecord) -> Self {
        record.into_value()
    }
}

/// Credential agents present in `X-Register-Token` when self-registering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterToken {
    pub token: String,
}

impl RegisterToken {
    /// Read the token out of a token endpoint's response data
    pub fn from_response(value: &Value) -> Option<Self> {
        match value {
            Value::String(token) => Some(Self { token: token.clone() }),
            Value::Object(map) => map
                .get("token")
                .and_then(Value::as_str)
                .map(|token| Self { token: token.to_string() }),
            _ => None,
        }
    }

    /// An empty token means registration by token is not configured yet
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Body an agent sends to `POST /host/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub hostname: String,
    pub ip: String,
    pub port: u16,
    pub alias: String,
    pub version: String,
    /// Ask the server to issue a client certificate in the response
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_cert: bool,
}

/// Body for `POST /host/provision`; the server picks the port (5921)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub hostname: String,
    pub ip: String,
}

/// Client certificate material returned by a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateBundle {
    pub ca_cert: String,
    pub client_cert: String,
    pub client_key: String,
}

impl CertificateBundle {
    /// Read `cert_bundle` out of the registration response data
    pub fn from_response(value: &Value) -> Option<Self> {
        cert_bundle(value)
    }
}

/// Server certificate material returned by provisioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCertificateBundle {
    pub ca_cert: String,
    pub server_cert: String,
    pub server_key: String,
}

impl ServerCertificateBundle {
    pub fn from_response(value: &Value) -> Option<Self> {
        cert_bundle(value)
    }
}

fn cert_bundle<B: serde::de::DeserializeOwned>(value: &Value) -> Option<B> {
    let bundle = value.get("cert_bundle")?;
    serde_json::from_value(bundle.clone()).ok()
}

/// Status codes carried in the `code` field of the response envelope
pub mod codes {
    pub const SUCCESS: i64 = 0;
    pub const FAILURE: i64 = 1;
    pub const NOT_FOUND: i64 = 2;
    pub const AUTH_ERROR: i64 = 3;
    pub const SERVER_ERROR: i64 = 4;
    pub const APP_NOT_INSTALLED: i64 = 801;
}

/// The `{code, message, data}` wrapper the server puts around every payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl ResponseEnvelope {
    /// Recognise an envelope: an object with an integer `code` and a string
    /// `message`. Other JSON shapes, including records that merely have a
    /// `code` field, return `None`.
    pub fn detect(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let code = obj.get("code")?.as_i64()?;
        let message = obj.get("message")?.as_str()?.to_string();
        let data = obj.get("data").cloned().unwrap_or(Value::Null);
        Some(Self { code, message, data })
    }

    pub fn is_success(&self) -> bool {
        self.code == codes::SUCCESS
    }
}
