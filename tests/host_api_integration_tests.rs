//! Integration tests for the host client over a real HTTP transport

use assert_matches::assert_matches;
use hostctl::{
    AgentClient, Config, HostApiClient, HostQuery, HttpClientConfig, HttpTransport, ProvisionRequest, RegisterToken,
    TransportError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 0,
        "message": "operation_success",
        "data": data
    }))
}

fn client_for(server: &MockServer) -> HostApiClient<HttpTransport> {
    let transport = HttpTransport::new(&format!("{}/api", server.uri()), &HttpClientConfig::default())
        .expect("transport");
    HostApiClient::new(transport)
}

#[tokio::test]
async fn test_list_sends_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host"))
        .and(query_param("status", "up"))
        .and(query_param("page", "1"))
        .respond_with(envelope(json!({"total": 1, "data": [{"id": 1, "name": "10.0.0.1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = HostQuery::new().with("status", "up").with("page", 1);
    let result = client.list(&query).await.unwrap();

    assert_eq!(result["total"], 1);
    assert_eq!(result["data"][0]["name"], "10.0.0.1");
}

#[tokio::test]
async fn test_all_has_no_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host/all"))
        .respond_with(envelope(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.all().await.unwrap();
    assert_eq!(result, json!([{"id": 1}, {"id": 2}]));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_detail_and_ping_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host/42"))
        .respond_with(envelope(json!({"id": 42, "alias": "worker"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/host/ping/42"))
        .respond_with(envelope(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.detail(42).await.unwrap(), json!({"id": 42, "alias": "worker"}));
    assert_eq!(client.ping(42).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_update_posts_body_unchanged() {
    let server = MockServer::start().await;
    let record = json!({"name": "h1", "alias": "web", "port": 5921, "remark": ""});
    Mock::given(method("POST"))
        .and(path("/api/host/store"))
        .and(header("content-type", "application/json"))
        .and(body_json(record.clone()))
        .respond_with(envelope(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.update(&record).await.unwrap(), json!({"id": 10}));
}

#[tokio::test]
async fn test_remove_posts_to_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/host/remove/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "Deleted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.remove("abc").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_register_token_is_fetched_every_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host/register-token"))
        .respond_with(envelope(json!({"token": "a1b2c3"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.get_register_token().await.unwrap();
    let second = client.get_register_token().await.unwrap();

    assert_eq!(first, second);
    let token = RegisterToken::from_response(&first).unwrap();
    assert_eq!(token.token, "a1b2c3");
}

#[tokio::test]
async fn test_generate_register_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/host/register-token/generate"))
        .respond_with(envelope(json!({"token": "ffee"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = client.generate_register_token().await.unwrap();
    assert_eq!(RegisterToken::from_response(&value).unwrap().token, "ffee");
}

#[tokio::test]
async fn test_envelope_failure_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/host/remove/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1,
            "message": "Delete failed",
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.remove(7).await.unwrap_err();
    assert_matches!(err, TransportError::Api { code: 1, ref message } if message == "Delete failed");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host/ping/3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.ping(3).await.unwrap_err();
    assert_matches!(err, TransportError::Status { status: 500, ref body } if body == "boom");
}

#[tokio::test]
async fn test_transport_from_config_sends_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host/all"))
        .and(header("Auth-Token", "session-token"))
        .and(header("Accept-Language", "zh-CN"))
        .respond_with(envelope(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::new_for_test(&format!("{}/api/", server.uri()), Some("session-token"));
    config.server.locale = Some("zh-CN".to_string());

    let transport = HttpTransport::from_config(&config).unwrap();
    let client = HostApiClient::new(transport);
    assert_eq!(client.all().await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_provision_sends_register_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/host/provision"))
        .and(header("X-Register-Token", "reg-secret"))
        .and(body_json(json!({"hostname": "worker-2", "ip": "10.0.0.8"})))
        .respond_with(envelope(json!({
            "cert_bundle": {"ca_cert": "CA", "server_cert": "SCERT", "server_key": "SKEY"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::new_for_test(&format!("{}/api", server.uri()), None);
    config.server.register_token = Some("reg-secret".to_string());
    let transport = HttpTransport::from_config(&config).unwrap();
    assert!(transport.has_register_token());

    let bundle = AgentClient::new(transport)
        .provision(&ProvisionRequest {
            hostname: "worker-2".to_string(),
            ip: "10.0.0.8".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(bundle.map(|b| b.server_cert), Some("SCERT".to_string()));
}
