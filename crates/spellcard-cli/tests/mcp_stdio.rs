//! Drives `spellcard-cli mcp` over pipes.

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

fn spawn_server() -> std::io::Result<Child> {
    Command::new(assert_cmd::cargo::cargo_bin("spellcard-cli"))
        .arg("mcp")
        .env("RUST_LOG", "info")
        .env_remove("SPELLCARD_TEMPLATES_DIR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
}

/// Kills the child on drop so a failing test does not leak processes.
struct ProcessGuard(Option<Child>);

impl ProcessGuard {
    fn new(child: Child) -> Self {
        Self(Some(child))
    }

    fn child_mut(&mut self) -> &mut Child {
        self.0.as_mut().expect("child taken")
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut c) = self.0.take() {
            let _ = c.kill();
            let _ = c.wait();
        }
    }
}

struct Session {
    guard: ProcessGuard,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    fn start() -> Self {
        let mut child = spawn_server().expect("failed to spawn spellcard-cli mcp");
        let stdout = BufReader::new(child.stdout.take().expect("stdout piped"));
        Self {
            guard: ProcessGuard::new(child),
            stdout,
        }
    }

    fn send(&mut self, request: &str) {
        let stdin = self
            .guard
            .child_mut()
            .stdin
            .as_mut()
            .expect("stdin piped");
        writeln!(stdin, "{}", request).unwrap();
        stdin.flush().unwrap();
    }

    fn read(&mut self) -> Value {
        let mut line = String::new();
        self.stdout.read_line(&mut line).unwrap();
        serde_json::from_str(&line)
            .unwrap_or_else(|e| panic!("stdout line {:?} is not JSON: {}", line, e))
    }

    fn request(&mut self, request: Value) -> Value {
        self.send(&request.to_string());
        self.read()
    }
}

#[test]
fn initialize_and_list_tools() {
    let mut session = Session::start();

    let init = session.request(json!({
        "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}
    }));
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");

    // notifications get no reply, so the next line belongs to list_tools
    session.send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string());
    let tools = session.request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));
    assert_eq!(tools["id"], 2);
    assert_eq!(tools["result"]["tools"][0]["name"], "generate_spell_card_stream");
}

#[test]
fn malformed_line_gets_parse_error_and_server_continues() {
    let mut session = Session::start();

    session.send("{invalid json}");
    let error = session.read();
    assert_eq!(error["error"]["code"], -32700);

    let pong = session.request(json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}));
    assert_eq!(pong["id"], "p");
    assert!(pong["result"].is_object());
}

#[test]
fn generate_streams_one_frame_per_line() {
    let mut session = Session::start();

    session.send(
        &json!({
            "jsonrpc": "2.0",
            "id": "gen-1",
            "method": "tools/call",
            "params": {
                "name": "generate_spell_card_stream",
                "arguments": {
                    "spell_data": {
                        "title": "Shield",
                        "casting_time": "1 reaction",
                        "range": "Self",
                        "components": "V, S",
                        "duration": "1 round",
                        "description": "An invisible barrier of magical force appears and protects you.",
                        "school": "Abjuration",
                        "level": 1
                    }
                }
            }
        })
        .to_string(),
    );

    let frames: Vec<Value> = (0..4).map(|_| session.read()).collect();
    let progress: Vec<u64> = frames
        .iter()
        .map(|f| f["params"]["progress"].as_u64().unwrap())
        .collect();
    assert_eq!(progress, vec![10, 30, 80, 100]);
    assert_eq!(frames[3]["params"]["status"], "completed");
    assert_eq!(frames[3]["params"]["card"]["format"], "jpeg");
}

#[test]
fn exits_cleanly_on_eof() {
    let mut session = Session::start();
    let child = session.guard.child_mut();
    drop(child.stdin.take());

    let status = child
        .wait_timeout(Duration::from_secs(10))
        .unwrap()
        .expect("server did not exit after stdin closed");
    assert!(status.success());
}
