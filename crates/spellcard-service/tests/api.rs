//! HTTP-level tests for the spell card service.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use spellcard_lib::CallbackPayload;
use spellcard_service::app;
use spellcard_service_shared::test_utils::{acid_splash, test_state, test_state_with_channel};
use spellcard_service_shared::{AppState, MetricsConfig};

fn server(state: AppState) -> TestServer {
    TestServer::new(app(state, &MetricsConfig::default())).unwrap()
}

fn sse_frames(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|payload| serde_json::from_str(payload.trim()).unwrap())
        .collect()
}

fn card_files(root: &std::path::Path) -> usize {
    let cards = root.join("cards");
    std::fs::read_dir(&cards)
        .map(|generators| {
            generators
                .filter_map(Result::ok)
                .filter_map(|entry| std::fs::read_dir(entry.path()).ok())
                .map(|files| files.count())
                .sum()
        })
        .unwrap_or(0)
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_queues_job_writes_card_and_calls_back() {
    let dir = tempfile::tempdir().unwrap();
    let (state, mut callbacks) = test_state_with_channel(dir.path());
    let server = server(state);

    let response = server
        .post("/v1/generate")
        .json(&json!({
            "spell_data": acid_splash(),
            "callback_url": "http://localhost:9000/callback",
            "generator": "plain"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["title"], "Acid Splash");
    assert!(!body["job_id"].as_str().unwrap().is_empty());
    assert!(body.get("content_type").is_none());

    let (url, payload) = tokio::time::timeout(Duration::from_secs(30), callbacks.recv())
        .await
        .expect("callback not delivered in time")
        .expect("callback channel closed");
    assert_eq!(url.as_str(), "http://localhost:9000/callback");
    assert_eq!(
        payload,
        CallbackPayload::Ready {
            title: "Acid Splash".to_string(),
            level: 0,
            filename: "L0.Acid-Splash.jpg".to_string(),
            url: "/cards/plain/L0.Acid-Splash.jpg".to_string(),
        }
    );

    let path = dir.path().join("cards/plain/L0.Acid-Splash.jpg");
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let served = server.get("/cards/plain/L0.Acid-Splash.jpg").await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), bytes.as_slice());
}

#[tokio::test(flavor = "multi_thread")]
async fn generator_defaults_to_plain() {
    let dir = tempfile::tempdir().unwrap();
    let (state, mut callbacks) = test_state_with_channel(dir.path());
    let server = server(state);

    server
        .post("/v1/generate")
        .json(&json!({"spell_data": acid_splash(), "callback_url": "http://localhost:9000/cb"}))
        .await
        .assert_status_ok();

    let (_, payload) = tokio::time::timeout(Duration::from_secs(30), callbacks.recv())
        .await
        .unwrap()
        .unwrap();
    match payload {
        CallbackPayload::Ready { url, .. } => assert!(url.starts_with("/cards/plain/")),
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_generator_is_404_problem_and_nothing_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let (state, mut callbacks) = test_state_with_channel(dir.path());
    let server = server(state);

    let response = server
        .post("/v1/generate")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-404"),
        )
        .json(&json!({
            "spell_data": acid_splash(),
            "callback_url": "http://localhost:9000/cb",
            "generator": "nonexistent"
        }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "application/problem+json"
    );
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/unknown-generator");
    assert_eq!(problem["instance"], "req-404");
    assert!(problem["detail"].as_str().unwrap().contains("plain, tornioduva"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(callbacks.try_recv().is_err());
    assert_eq!(card_files(dir.path()), 0);
}

#[tokio::test]
async fn invalid_spell_is_400_problem() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    let mut spell = acid_splash();
    spell["title"] = json!("   ");
    let response = server
        .post("/v1/generate")
        .json(&json!({"spell_data": spell}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/invalid-request");
    assert!(problem["detail"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn malformed_body_is_400_problem() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    let response = server
        .post("/v1/generate")
        .json(&json!({"callback_url": "http://localhost:9000/cb"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert_eq!(problem["status"], 400);
    assert!(problem["detail"].as_str().unwrap().contains("spell_data"));
}

#[tokio::test]
async fn generators_lists_registry() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    let response = server.get("/v1/generators").await;
    response.assert_status_ok();
    response.assert_json(&json!({"plain": "available", "tornioduva": "available"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn mcp_stream_through_service() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    let response = server
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": "test-4",
            "method": "generate_spell_card_stream",
            "params": {
                "generator": "tornioduva",
                "spell_data": {
                    "title": "Magic Missile",
                    "casting_time": "1 action",
                    "range": "120 feet",
                    "components": "V, S",
                    "duration": "Instantaneous",
                    "description": "You create three glowing darts of magical force.",
                    "school": "Evocation",
                    "level": 1
                }
            }
        }))
        .await;
    response.assert_status_ok();

    let frames = sse_frames(&response.text());
    let progress: Vec<u64> = frames
        .iter()
        .map(|f| f["params"]["progress"].as_u64().unwrap())
        .collect();
    assert_eq!(progress, vec![10, 30, 80, 100]);
    assert_eq!(frames[3]["params"]["status"], "completed");
    assert_eq!(frames[3]["params"]["card"]["title"], "Magic Missile");
    // streaming never writes to the card store
    assert_eq!(card_files(dir.path()), 0);
}

#[tokio::test]
async fn mcp_invalid_method_is_json_rpc_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    let response = server
        .post("/mcp")
        .json(&json!({"jsonrpc": "2.0", "method": "invalid_method", "id": "test-2"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn health_probes_report_ok() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    server.get("/health/live").await.assert_status_ok();
    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["generators"], json!(["plain", "tornioduva"]));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_state(dir.path()));

    let response = server.get("/v1/generators").await;
    let id = response.header("x-request-id");
    assert_eq!(id.to_str().unwrap().len(), 36);
}
