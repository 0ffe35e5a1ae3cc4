//! End-to-end tests for `POST /mcp` over the axum router.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::{json, Value};
use spellcard_lib::{CardStore, Dispatcher, FormatterRegistry, HttpCallbackNotifier};
use spellcard_mcp::{http, McpServer, GENERATE_TOOL, PROGRESS_METHOD};

fn test_server(cards: &std::path::Path) -> TestServer {
    let registry = Arc::new(FormatterRegistry::builtin(None).unwrap());
    let notifier = Arc::new(HttpCallbackNotifier::new(Duration::from_secs(1)).unwrap());
    let dispatcher = Dispatcher::new(registry, CardStore::new(cards), notifier);
    TestServer::new(http::router(Arc::new(McpServer::new(dispatcher)))).unwrap()
}

/// Parse `data:` lines of an SSE body.
fn sse_frames(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|payload| serde_json::from_str(payload.trim()).unwrap())
        .collect()
}

fn magic_missile() -> Value {
    json!({
        "title": "Magic Missile",
        "casting_time": "1 action",
        "range": "120 feet",
        "components": "V, S",
        "duration": "Instantaneous",
        "description": "You create three glowing darts of magical force.",
        "school": "Evocation",
        "level": 1
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn list_tools_returns_the_stream_tool() {
    let cards = tempfile::tempdir().unwrap();
    let server = test_server(cards.path());

    let response = server
        .post("/mcp")
        .json(&json!({"jsonrpc": "2.0", "method": "list_tools", "id": "test-1"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], "test-1");
    assert_eq!(body["result"]["tools"][0]["name"], GENERATE_TOOL);
    assert_eq!(
        body["result"]["tools"][0]["inputSchema"]["properties"]["generator"]["enum"],
        json!(["plain", "tornioduva"])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_json_is_a_parse_error() {
    let cards = tempfile::tempdir().unwrap();
    let server = test_server(cards.path());

    let response = server.post("/mcp").text("{invalid json}").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test(flavor = "multi_thread")]
async fn streaming_generation_emits_four_frames_in_order() {
    let cards = tempfile::tempdir().unwrap();
    let server = test_server(cards.path());

    let response = server
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "method": GENERATE_TOOL,
            "params": {"generator": "tornioduva", "spell_data": magic_missile()},
            "id": "test-4"
        }))
        .await;
    response.assert_status_ok();
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/event-stream"));

    let frames = sse_frames(&response.text());
    assert_eq!(frames.len(), 4);
    for frame in &frames {
        assert_eq!(frame["jsonrpc"], "2.0");
        assert_eq!(frame["method"], PROGRESS_METHOD);
    }
    let progress: Vec<u64> = frames
        .iter()
        .map(|f| f["params"]["progress"].as_u64().unwrap())
        .collect();
    assert_eq!(progress, vec![10, 30, 80, 100]);

    let last = &frames[3]["params"];
    assert_eq!(last["status"], "completed");
    assert_eq!(last["card"]["title"], "Magic Missile");
    assert_eq!(last["card"]["level"], 1);
    assert_eq!(last["data"], last["card"]["image_data"]);
    assert!(last["data"].as_str().unwrap().starts_with("/9j/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_generator_gets_an_immediate_error() {
    let cards = tempfile::tempdir().unwrap();
    let server = test_server(cards.path());

    let response = server
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "method": GENERATE_TOOL,
            "params": {"generator": "nonexistent", "spell_data": magic_missile()},
            "id": "test-5"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], -32602);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid generator"));
    assert!(std::fs::read_dir(cards.path()).unwrap().next().is_none());
}
