//! In-process LSP integration tests.
//!
//! These drive the server through tower-lsp's in-process service, so no
//! subprocess or stdio framing is involved.

use futures::StreamExt;
use serde_json::{Value, json};
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tower::Service;
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::{ClientSocket, LspService};

use sensei_lsp::SenseiLanguageServer;

const URI: &str = "file:///profiles/pizza.yaml";

const COMPLETE: &str = r#"test_name: "pizza_order"
llm:
  temperature: 0.8
  format:
    type: text
user:
  language: English
  role: you order a pizza
  goals:
    - a {{pizza_size}} pizza
    - pizza_size:
        function: forward()
        data:
          - small
          - big
chatbot:
  is_starter: False
  fallback: Sorry, can you repeat?
conversation:
  number: all_combinations
  goal_style:
    steps: 2
  interaction_style:
    - single question
"#;

/// Helper to create a JSON-RPC request
fn make_request(id: i64, method: &str, params: Value) -> Request {
    let req = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    });
    serde_json::from_value(req).expect("valid request")
}

/// Helper to create a JSON-RPC notification (no id)
fn make_notification(method: &str, params: Value) -> Request {
    let req = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    });
    serde_json::from_value(req).expect("valid notification")
}

/// A running server plus the channel its notifications are forwarded to.
struct Harness {
    service: LspService<SenseiLanguageServer>,
    notifications: Receiver<Request>,
    drain_task: JoinHandle<()>,
}

impl Harness {
    /// Start a server and complete the initialize handshake.
    async fn start(options: Value) -> Self {
        let (mut service, socket) = LspService::new(SenseiLanguageServer::new);
        let (notifications, drain_task) = drain(socket);

        let init = make_request(
            1,
            "initialize",
            json!({
                "processId": null,
                "capabilities": {},
                "rootUri": null,
                "initializationOptions": options
            }),
        );
        let response = service.call(init).await.unwrap().expect("initialize response");
        let (_, result) = response.into_parts();
        let result = result.expect("initialize succeeds");
        assert_eq!(result["serverInfo"]["name"], "sensei-lsp");
        assert_eq!(result["capabilities"]["textDocumentSync"], 1);

        let _ = service.call(make_notification("initialized", json!({}))).await;

        Self {
            service,
            notifications,
            drain_task,
        }
    }

    async fn notify(&mut self, method: &str, params: Value) {
        let _ = self.service.call(make_notification(method, params)).await;
    }

    async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        let response: Option<Response> =
            self.service.call(make_request(id, method, params)).await.unwrap();
        let (_, result) = response.expect("response").into_parts();
        result.expect("request succeeds")
    }

    async fn open(&mut self, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": URI,
                    "languageId": "yaml",
                    "version": 1,
                    "text": text
                }
            }),
        )
        .await;
    }

    async fn change(&mut self, version: i32, text: &str) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": URI, "version": version },
                "contentChanges": [{ "text": text }]
            }),
        )
        .await;
    }

    /// Next publishDiagnostics params for our document, if one arrives in time.
    async fn next_diagnostics(&mut self) -> Option<Value> {
        let timeout = tokio::time::sleep(tokio::time::Duration::from_secs(2));
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                Some(notification) = self.notifications.recv() => {
                    if notification.method() != "textDocument/publishDiagnostics" {
                        continue;
                    }
                    let Some(params) = notification.params() else {
                        continue;
                    };
                    if params.get("uri").and_then(|u| u.as_str()) == Some(URI) {
                        return Some(params.clone());
                    }
                }
                _ = &mut timeout => return None,
            }
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.drain_task.abort();
    }
}

/// Forward server-to-client notifications into a channel.
fn drain(socket: ClientSocket) -> (Receiver<Request>, JoinHandle<()>) {
    let (mut notifications, _responses) = socket.split();
    let (tx, rx) = tokio::sync::mpsc::channel::<Request>(32);
    let task = tokio::spawn(async move {
        while let Some(notification) = notifications.next().await {
            let _ = tx.send(notification).await;
        }
    });
    (rx, task)
}

fn messages(params: &Value) -> Vec<String> {
    params["diagnostics"]
        .as_array()
        .expect("diagnostics array")
        .iter()
        .map(|d| d["message"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_typo_published_on_open() {
    let mut harness = Harness::start(json!({ "required_hints": false })).await;
    harness.open("user:\n  languege: English\n").await;

    let params = harness.next_diagnostics().await.expect("diagnostics published");
    assert_eq!(params["version"], 1);

    let diagnostics = params["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    let diag = &diagnostics[0];
    assert_eq!(diag["message"], "unknown key 'languege', did you mean 'language'?");
    assert_eq!(diag["severity"], 2);
    assert_eq!(diag["source"], "sensei");
    assert_eq!(diag["range"]["start"], json!({ "line": 1, "character": 2 }));
    assert_eq!(diag["range"]["end"], json!({ "line": 1, "character": 10 }));
    assert_eq!(diag["data"]["candidates"], json!(["language"]));
}

#[tokio::test]
async fn test_complete_profile_is_clean() {
    let mut harness = Harness::start(json!({})).await;
    harness.open(COMPLETE).await;

    let params = harness.next_diagnostics().await.expect("diagnostics published");
    assert!(messages(&params).is_empty(), "{:?}", messages(&params));
}

#[tokio::test]
async fn test_missing_required_keys_are_hints() {
    let mut harness = Harness::start(json!({})).await;
    harness.open("llm:\n  temperature: 0.8\n").await;

    let params = harness.next_diagnostics().await.expect("diagnostics published");
    let diagnostics = params["diagnostics"].as_array().unwrap();
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| d["severity"] == 4));
    assert!(messages(&params).contains(&"missing required key 'user'".to_string()));
}

#[tokio::test]
async fn test_completion_under_llm() {
    let mut harness = Harness::start(json!({})).await;
    harness.open("llm:\n  ").await;

    let result = harness
        .request(
            2,
            "textDocument/completion",
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 1, "character": 2 },
                "context": { "triggerKind": 1 }
            }),
        )
        .await;

    let items = result.as_array().expect("completion items");
    let labels: Vec<&str> = items.iter().filter_map(|i| i["label"].as_str()).collect();
    assert_eq!(labels, ["temperature", "model", "format"]);

    let format = &items[2];
    assert_eq!(format["kind"], 14);
    assert_eq!(format["insertTextFormat"], 2);
    assert_eq!(format["textEdit"]["newText"], "format: \n    $0");
    assert_eq!(
        format["textEdit"]["range"]["start"],
        json!({ "line": 1, "character": 2 })
    );
}

#[tokio::test]
async fn test_completion_above_existing_keys() {
    let mut harness = Harness::start(json!({})).await;
    harness.open("llm:\n  \n  model: gpt-4o\nuser:\n").await;

    let result = harness
        .request(
            2,
            "textDocument/completion",
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 1, "character": 2 },
                "context": { "triggerKind": 1 }
            }),
        )
        .await;

    let items = result.as_array().expect("completion items");
    let format = items
        .iter()
        .find(|i| i["label"] == "format")
        .expect("format offered under llm");
    // Indented from the cursor's own line, not the line below it.
    assert_eq!(format["textEdit"]["newText"], "format: \n    $0");
    assert_eq!(
        format["textEdit"]["range"],
        json!({
            "start": { "line": 1, "character": 2 },
            "end": { "line": 1, "character": 2 }
        })
    );
}

#[tokio::test]
async fn test_completion_of_function_values() {
    let mut harness = Harness::start(json!({})).await;
    let text = "user:\n  goals:\n    - size:\n        function: ";
    harness.open(text).await;

    let result = harness
        .request(
            2,
            "textDocument/completion",
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 3, "character": 18 },
                "context": { "triggerKind": 2, "triggerCharacter": " " }
            }),
        )
        .await;

    let items = result.as_array().expect("completion items");
    let random = items
        .iter()
        .find(|i| i["label"] == "random")
        .expect("random offered");
    assert_eq!(random["kind"], 3);
    assert_eq!(random["textEdit"]["newText"], "random($0)");
}

#[tokio::test]
async fn test_code_action_replaces_key() {
    let mut harness = Harness::start(json!({ "required_hints": false })).await;
    harness.open("user:\n  languege: English\n").await;

    let params = harness.next_diagnostics().await.expect("diagnostics published");
    let diagnostic = params["diagnostics"][0].clone();

    let result = harness
        .request(
            3,
            "textDocument/codeAction",
            json!({
                "textDocument": { "uri": URI },
                "range": diagnostic["range"],
                "context": { "diagnostics": [diagnostic] }
            }),
        )
        .await;

    let actions = result.as_array().expect("code actions");
    assert_eq!(actions.len(), 1);
    let action = &actions[0];
    assert_eq!(action["title"], "Replace 'languege' with 'language'");
    assert_eq!(action["kind"], "quickfix");
    assert_eq!(action["isPreferred"], true);

    let edits = &action["edit"]["changes"][URI];
    assert_eq!(edits[0]["newText"], "language");
    assert_eq!(edits[0]["range"]["start"], json!({ "line": 1, "character": 2 }));
}

#[tokio::test]
async fn test_hover_on_key() {
    let mut harness = Harness::start(json!({})).await;
    harness.open("chatbot:\n  fallback: Sorry?\n").await;

    let result = harness
        .request(
            4,
            "textDocument/hover",
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 0, "character": 3 }
            }),
        )
        .await;

    let value = result["contents"]["value"].as_str().expect("markdown hover");
    assert!(value.starts_with("**chatbot**"), "{value}");
    assert!(value.contains("`is_starter`"), "{value}");
}

#[tokio::test]
async fn test_debounced_change_publishes_latest_version() {
    let mut harness =
        Harness::start(json!({ "lint_debounce_ms": 100, "required_hints": false })).await;
    harness.open("llm:\n  model: gpt-4o\n").await;

    let opened = harness.next_diagnostics().await.expect("diagnostics on open");
    assert!(messages(&opened).is_empty());

    // Two edits inside one debounce window: only the latest is linted.
    harness.change(2, "llm:\n  modle: gpt-4o\n").await;
    harness.change(3, "llm:\n  formatt:\n").await;

    let params = harness.next_diagnostics().await.expect("debounced diagnostics");
    assert_eq!(params["version"], 3);
    assert_eq!(
        messages(&params),
        ["unknown key 'formatt', did you mean 'format'?"]
    );
}

#[tokio::test]
async fn test_close_clears_diagnostics() {
    let mut harness = Harness::start(json!({ "required_hints": false })).await;
    harness.open("user:\n  languege: English\n").await;
    let _ = harness.next_diagnostics().await.expect("diagnostics on open");

    harness
        .notify("textDocument/didClose", json!({ "textDocument": { "uri": URI } }))
        .await;

    let params = harness.next_diagnostics().await.expect("clearing publish");
    assert!(messages(&params).is_empty());
}
