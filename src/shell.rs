//! JSON message protocol for a presentation shell
//!
//! A shell (webview, chat panel, stdio bridge) sends one tagged message per
//! user action and gets exactly one reply back. `llmRequest` goes through the
//! full pipeline; the other messages are direct actions that skip the model.

use crate::command::envelope::StructuredCommand;
use crate::core::error::PilotError;
use crate::editor::EditorSession;
use crate::orchestrator::Orchestrator;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Catalog commands the direct actions map onto
const OPEN_FILE_COMMAND: &str = "quickOpen";
const GO_TO_LINE_COMMAND: &str = "goToLine";

/// Inbound message from the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShellRequest {
    /// Free-text instruction for the model
    LlmRequest {
        message: String,
        /// Endpoint base URL; blank means the configured default
        #[serde(default)]
        url: String,
    },
    OpenFile {
        #[serde(rename = "fileName")]
        file_name: String,
    },
    GoToLineColumn {
        line: i64,
        #[serde(default)]
        column: Option<i64>,
    },
    Notify { text: String },
}

/// Outbound reply to the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShellReply {
    /// Confirmation JSON of the executed command
    LlmResponse { response: String },
    LlmError { error: String },
    /// A direct action finished
    Done { command: String },
    /// A direct action, or the message itself, was rejected
    Error { error: String },
}

/// Serves shell messages against one editor session
pub struct Shell {
    orchestrator: Orchestrator,
    session: EditorSession,
    default_endpoint: String,
}

impl Shell {
    pub fn new(
        orchestrator: Orchestrator,
        session: EditorSession,
        default_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            session,
            default_endpoint: default_endpoint.into(),
        }
    }

    /// Parse one JSON message and handle it
    pub async fn handle_line(&self, line: &str) -> ShellReply {
        match serde_json::from_str::<ShellRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "malformed shell message");
                ShellReply::Error {
                    error: format!("malformed message: {}", e),
                }
            }
        }
    }

    pub async fn handle(&self, request: ShellRequest) -> ShellReply {
        match request {
            ShellRequest::LlmRequest { message, url } => self.llm_request(&message, &url).await,
            ShellRequest::OpenFile { file_name } => {
                let file_name = file_name.trim();
                if file_name.is_empty() {
                    return reject("fileName must not be empty");
                }
                let command = StructuredCommand::with_params(
                    OPEN_FILE_COMMAND,
                    [("fileName", json!(file_name))],
                );
                self.direct(command).await
            }
            ShellRequest::GoToLineColumn { line, column } => {
                let command = StructuredCommand::with_params(
                    GO_TO_LINE_COMMAND,
                    [("line", json!(line)), ("column", json!(column.unwrap_or(1)))],
                );
                self.direct(command).await
            }
            ShellRequest::Notify { text } => {
                let lease = self.session.acquire().await;
                match lease.host().show_information(&text).await {
                    Ok(()) => ShellReply::Done {
                        command: "notify".to_string(),
                    },
                    Err(e) => reject(e.to_string()),
                }
            }
        }
    }

    async fn llm_request(&self, message: &str, url: &str) -> ShellReply {
        let message = message.trim();
        if message.is_empty() {
            return ShellReply::LlmError {
                error: "message must not be empty".to_string(),
            };
        }

        let endpoint = match url.trim() {
            "" => self.default_endpoint.as_str(),
            url => url,
        };

        match self.orchestrator.run(&self.session, message, endpoint).await {
            Ok(report) => ShellReply::LlmResponse {
                response: report.confirmation(),
            },
            Err(e) => ShellReply::LlmError {
                error: describe(&e),
            },
        }
    }

    async fn direct(&self, command: StructuredCommand) -> ShellReply {
        match self.orchestrator.execute(&self.session, command).await {
            Ok(report) => ShellReply::Done {
                command: report.command.command,
            },
            Err(e) => reject(describe(&e)),
        }
    }
}

fn describe(error: &PilotError) -> String {
    format!("[{}] {}", error.kind(), error)
}

fn reject(error: impl Into<String>) -> ShellReply {
    ShellReply::Error {
        error: error.into(),
    }
}
