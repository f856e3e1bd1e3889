//! LSP server implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sensei_schema::{EntryKind, SchemaEntry};
use sensei_yaml::{apply_completion, get_completions, key_at, lint_typos_with, required_hints};
use serde_json::json;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};

use crate::config::{SenseiUserConfig, load_config};

/// Source tag on every diagnostic this server publishes.
const SOURCE: &str = "sensei";

/// Document state tracked by the server
struct DocumentState {
    /// Document content
    content: String,
    /// Document version
    version: i32,
}

type Documents = Arc<RwLock<HashMap<Url, DocumentState>>>;

/// The Sensei language server
pub struct SenseiLanguageServer {
    /// LSP client for sending notifications
    client: Client,
    /// Open documents
    documents: Documents,
    /// Effective configuration (user file, then initialization options)
    config: Arc<RwLock<SenseiUserConfig>>,
}

impl SenseiLanguageServer {
    pub fn new(client: Client) -> Self {
        let config = match load_config() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Ignoring user config");
                SenseiUserConfig::default()
            }
        };

        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Lint and publish right away.
    async fn publish_now(&self, uri: Url, content: &str, version: i32) {
        let config = self.config.read().await.clone();
        let diagnostics = compute_diagnostics(content, &config);
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }

    /// Lint after the debounce window, unless a newer edit arrived meanwhile.
    fn spawn_debounced_lint(&self, uri: Url, spawn_version: i32) {
        let client = self.client.clone();
        let documents = Arc::clone(&self.documents);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            let config = config.read().await.clone();
            tokio::time::sleep(Duration::from_millis(config.lint_debounce_ms)).await;

            // Snapshot content and version together, after the sleep.
            let snapshot = {
                let docs = documents.read().await;
                docs.get(&uri).map(|d| (d.version, d.content.clone()))
            };
            let Some((version, content)) = snapshot else {
                // Closed during the debounce window.
                return;
            };
            if version != spawn_version {
                debug!(%uri, spawn_version, version, "Superseded lint dropped");
                return;
            }

            let diagnostics = compute_diagnostics(&content, &config);
            client
                .publish_diagnostics(uri, diagnostics, Some(version))
                .await;
        });
    }
}

/// Compute diagnostics for document content
fn compute_diagnostics(content: &str, config: &SenseiUserConfig) -> Vec<Diagnostic> {
    let registry = sensei_schema::builtin();
    let mut found = lint_typos_with(registry, content, &config.typo.lint_options());
    if config.required_hints {
        found.extend(required_hints(content));
    }

    found
        .into_iter()
        .map(|diag| to_lsp_diagnostic(content, diag))
        .collect()
}

fn to_lsp_diagnostic(content: &str, diag: sensei_yaml::Diagnostic) -> Diagnostic {
    let severity = match diag.severity {
        sensei_yaml::Severity::Warning => DiagnosticSeverity::WARNING,
        sensei_yaml::Severity::Hint => DiagnosticSeverity::HINT,
    };

    // Quick fixes travel with the diagnostic so code_action needs no re-lint.
    let data = (!diag.fixes.is_empty()).then(|| {
        let candidates: Vec<&str> = diag.fixes.iter().map(|f| f.replacement.as_str()).collect();
        json!({
            "type": "replace_key",
            "from": &content[diag.from..diag.to],
            "candidates": candidates,
        })
    });

    Diagnostic {
        range: Range {
            start: offset_to_position(content, diag.from),
            end: offset_to_position(content, diag.to),
        },
        severity: Some(severity),
        code: None,
        code_description: None,
        source: Some(SOURCE.to_string()),
        message: diag.message,
        related_information: None,
        tags: None,
        data,
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for SenseiLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options {
            match serde_json::from_value::<SenseiUserConfig>(options) {
                Ok(config) => {
                    debug!(?config, "Using initialization options");
                    *self.config.write().await = config;
                }
                Err(e) => warn!(error = %e, "Ignoring malformed initialization options"),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Full document sync - we get the whole document on each change
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                // Hover information
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                // Auto-completion
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![":".into(), " ".into(), "-".into()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                // Code actions (quick fixes)
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "sensei-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Sensei language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = params.text_document.text;
        let version = params.text_document.version;

        self.publish_now(uri.clone(), &content, version).await;

        let mut docs = self.documents.write().await;
        docs.insert(uri, DocumentState { content, version });
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // With FULL sync, we get the entire document content
        let Some(change) = params.content_changes.into_iter().next() else {
            return;
        };

        {
            let mut docs = self.documents.write().await;
            docs.insert(
                uri.clone(),
                DocumentState {
                    content: change.text,
                    version,
                },
            );
        }

        self.spawn_debounced_lint(uri, version);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        {
            let mut docs = self.documents.write().await;
            docs.remove(&uri);
        }

        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let docs = self.documents.read().await;
        let Some(doc) = docs.get(&uri) else {
            return Ok(None);
        };

        // Trigger characters count as an explicit request; re-filtering an
        // incomplete list does not.
        let explicit = params.context.as_ref().is_none_or(|ctx| {
            ctx.trigger_kind != CompletionTriggerKind::TRIGGER_FOR_INCOMPLETE_COMPLETIONS
        });

        let offset = position_to_offset(&doc.content, position);
        let result = get_completions(&doc.content, offset, explicit);
        debug!(context = %result.context, count = result.options.len(), "completion");
        if result.options.is_empty() {
            return Ok(None);
        }

        let range = Range {
            start: offset_to_position(&doc.content, result.from),
            end: offset_to_position(&doc.content, result.to),
        };

        let items = result
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let edit = apply_completion(&doc.content, result.from, result.to, option.entry);
                completion_item(option.entry, option.boost, index, range, &edit)
            })
            .collect();

        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let mut actions = Vec::new();

        // Process each diagnostic to generate code actions (quickfixes)
        for diag in params.context.diagnostics {
            // Only process our diagnostics
            if diag.source.as_deref() != Some(SOURCE) {
                continue;
            }

            let Some(data) = &diag.data else {
                continue;
            };
            if data.get("type").and_then(|v| v.as_str()) != Some("replace_key") {
                continue;
            }
            let from = data.get("from").and_then(|v| v.as_str()).unwrap_or("key");
            let candidates = data
                .get("candidates")
                .and_then(|v| v.as_array())
                .into_iter()
                .flatten()
                .filter_map(|v| v.as_str());

            for (i, to) in candidates.enumerate() {
                let edit = TextEdit {
                    range: diag.range,
                    new_text: to.to_string(),
                };

                let mut changes = HashMap::new();
                changes.insert(uri.clone(), vec![edit]);

                actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                    title: format!("Replace '{}' with '{}'", from, to),
                    kind: Some(CodeActionKind::QUICKFIX),
                    diagnostics: Some(vec![diag.clone()]),
                    edit: Some(WorkspaceEdit {
                        changes: Some(changes),
                        ..Default::default()
                    }),
                    is_preferred: Some(i == 0),
                    ..Default::default()
                }));
            }
        }

        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let docs = self.documents.read().await;
        let Some(doc) = docs.get(&uri) else {
            return Ok(None);
        };

        let offset = position_to_offset(&doc.content, position);
        let Some(key) = key_at(&doc.content, offset) else {
            return Ok(None);
        };

        let (_, entries) = sensei_schema::builtin().lookup(&key.parent);
        let Some(entry) = entries.iter().find(|e| e.label == key.key) else {
            return Ok(None);
        };

        let path = if key.parent.is_empty() {
            key.key.clone()
        } else {
            format!("{}.{}", key.parent, key.key)
        };

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: format_entry_hover(&path, entry),
            }),
            range: Some(Range {
                start: offset_to_position(&doc.content, key.from),
                end: offset_to_position(&doc.content, key.to),
            }),
        }))
    }
}

fn completion_item_kind(kind: EntryKind) -> CompletionItemKind {
    match kind {
        EntryKind::Keyword => CompletionItemKind::KEYWORD,
        EntryKind::Value => CompletionItemKind::VALUE,
        EntryKind::Function => CompletionItemKind::FUNCTION,
        EntryKind::Variable => CompletionItemKind::VARIABLE,
    }
}

fn completion_item(
    entry: &SchemaEntry,
    boost: i32,
    index: usize,
    range: Range,
    edit: &sensei_yaml::TextEdit,
) -> CompletionItem {
    CompletionItem {
        label: entry.label.to_string(),
        kind: Some(completion_item_kind(entry.kind)),
        detail: Some(entry.kind.as_str().to_string()),
        documentation: Some(Documentation::String(entry.info.to_string())),
        // Boosted entries first, then schema order.
        sort_text: Some(format!("{}{:04}", 9 - boost.clamp(0, 9), index)),
        filter_text: Some(entry.label.to_string()),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        // The inserted indentation is already relative to the current line.
        insert_text_mode: Some(InsertTextMode::AS_IS),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: snippet(&edit.insert, edit.cursor - edit.from),
        })),
        ..Default::default()
    }
}

/// Snippet text with the final tab stop at `cursor`.
fn snippet(text: &str, cursor: usize) -> String {
    fn escape(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('$', "\\$")
            .replace('}', "\\}")
    }
    format!("{}$0{}", escape(&text[..cursor]), escape(&text[cursor..]))
}

/// Format hover content for a schema entry.
fn format_entry_hover(path: &str, entry: &SchemaEntry) -> String {
    let mut content = format!("**{}** `{}`\n\n{}", entry.label, path, entry.info);

    let required = sensei_schema::required().required_at(path);
    if !required.is_empty() && !path.is_empty() {
        content.push_str("\n\nRequired: ");
        let names: Vec<String> = required.iter().map(|k| format!("`{k}`")).collect();
        content.push_str(&names.join(", "));
    }

    content
}

/// Convert byte offset to LSP Position.
///
/// Columns are UTF-16 code units, the protocol's default position encoding.
fn offset_to_position(content: &str, offset: usize) -> Position {
    let mut line = 0u32;
    let mut col = 0u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += ch.len_utf16() as u32;
        }
    }

    Position::new(line, col)
}

/// Convert LSP Position (UTF-16 columns) to byte offset
fn position_to_offset(content: &str, position: Position) -> usize {
    let mut current_line = 0u32;
    let mut current_col = 0u32;

    for (i, ch) in content.char_indices() {
        // `>=` so a column inside a surrogate pair lands after that char.
        if current_line == position.line && current_col >= position.character {
            return i;
        }
        if ch == '\n' {
            if current_line == position.line {
                // Position is past end of line
                return i;
            }
            current_line += 1;
            current_col = 0;
        } else {
            current_col += ch.len_utf16() as u32;
        }
    }

    content.len()
}

/// Run the LSP server on stdin/stdout
pub async fn run() -> eyre::Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting sensei-lsp");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(SenseiLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
