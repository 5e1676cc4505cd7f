//! Integration tests for the backend REST client
//!
//! Each test runs against a local mock HTTP server.
//!
//! ```bash
//! cargo test --test api_integration
//! ```

use std::time::Duration;

use app_lib::api::{AgentCreateRequest, CallStartRequest, CallStatus};
use app_lib::{open_web_call_for, ApiClient, ApiError};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn call_row(id: &str, token: Option<&str>) -> Value {
    json!({
        "id": id,
        "driver_name": "Mike",
        "phone_number": "+15551234567",
        "load_number": "7890",
        "agent_config_id": "cfg-1",
        "status": "in_progress",
        "retell_call_id": "call_abc",
        "retell_call_access_token": token,
        "summary": null,
        "transcript": null,
        "started_at": "2026-01-05T10:00:00Z",
        "completed_at": null
    })
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.list_calls().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    let message = err.to_string();
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("boom"), "{}", message);
}

#[tokio::test]
async fn list_agents_reads_config_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/configs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "cfg-1", "agent_id": "ag_1", "agent_name": "Dispatch"},
            {"id": "cfg-2", "agent_id": "ag_2", "agent_name": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let agents = client_for(&server).await.list_agents().await.unwrap();
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].display_name(), "Dispatch");
    assert_eq!(agents[1].display_name(), "ag_2");
}

#[tokio::test]
async fn create_agent_posts_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/configs/"))
        .and(body_json(json!({"agent_name": "Dispatch"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agent_id": "ag_9",
            "agent_name": "Dispatch",
            "response_engine": {"type": "conversation-flow"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = AgentCreateRequest {
        agent_name: Some("Dispatch".to_string()),
        voice_id: None,
    };
    let agent = client_for(&server)
        .await
        .create_agent(&request)
        .await
        .unwrap();
    assert_eq!(agent.agent_id, "ag_9");
    assert!(agent.extra.contains_key("response_engine"));
}

#[tokio::test]
async fn update_agent_puts_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/configs/ag_1"))
        .and(body_json(json!({"voice_speed": 1.2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agent_id": "ag_1",
            "voice_speed": 1.2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut body = Map::new();
    body.insert("voice_speed".to_string(), json!(1.2));
    let agent = client_for(&server)
        .await
        .update_agent("ag_1", &body)
        .await
        .unwrap();
    assert_eq!(agent.voice_speed, Some(1.2));
}

#[tokio::test]
async fn flow_version_is_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/configs/flows/cf_1"))
        .and(query_param("version", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_flow_id": "cf_1",
            "version": 3,
            "nodes": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = client_for(&server)
        .await
        .get_conversation_flow("cf_1", Some(3))
        .await
        .unwrap();
    assert_eq!(flow["version"], 3);
}

#[tokio::test]
async fn start_call_posts_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/calls/start"))
        .and(body_json(json!({
            "driver_name": "Mike",
            "phone_number": "+15551234567",
            "load_number": "7890",
            "agent_config_id": "cfg-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(call_row("c1", Some("tok"))))
        .expect(1)
        .mount(&server)
        .await;

    let request = CallStartRequest {
        driver_name: "Mike".to_string(),
        phone_number: "+15551234567".to_string(),
        load_number: "7890".to_string(),
        agent_config_id: "cfg-1".to_string(),
    };
    let call = client_for(&server)
        .await
        .start_call(&request)
        .await
        .unwrap();
    assert_eq!(call.status, CallStatus::InProgress);
}

#[tokio::test]
async fn refresh_summary_posts_to_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/calls/c1/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(call_row("c1", None)))
        .expect(1)
        .mount(&server)
        .await;

    let call = client_for(&server)
        .await
        .refresh_summary("c1")
        .await
        .unwrap();
    assert_eq!(call.id, "c1");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.get_call("c1").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn web_call_dialog_uses_call_token_and_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(call_row("c1", Some("tok_123"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/calls/c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(call_row("c2", None)))
        .mount(&server)
        .await;

    let api = client_for(&server).await;

    let dialog = open_web_call_for(&api, "c1").await.unwrap();
    assert_eq!(dialog.title, "Mike - Load 7890");
    assert_eq!(dialog.access_token.as_deref(), Some("tok_123"));

    let dialog = open_web_call_for(&api, "c2").await.unwrap();
    assert!(dialog.access_token.is_none());
}

#[tokio::test]
async fn web_call_dialog_propagates_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Call not found"))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let err = open_web_call_for(&api, "missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}
