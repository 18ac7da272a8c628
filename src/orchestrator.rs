//! Execution orchestrator - the public entry point
//!
//! user text -> system prompt -> completion -> interpret -> dispatch -> report
//!
//! A run holds the editor session for its whole duration, so a second run
//! waits until the first has finished its handler chain. There is no retry at
//! any stage and no cancellation: the first failure ends the run.

use crate::command::dispatcher::{DispatchRoute, Dispatcher};
use crate::command::envelope::StructuredCommand;
use crate::core::config::PilotConfig;
use crate::core::error::{PilotError, Result};
use crate::editor::EditorSession;
use crate::llm::client::CompletionClient;
use crate::llm::interpreter::interpret;
use crate::llm::prompt::build_system_prompt;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Source of raw completion text
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, endpoint_url: &str, system_prompt: &str, user_text: &str)
        -> Result<String>;
}

#[async_trait]
impl Completion for CompletionClient {
    async fn complete(
        &self,
        endpoint_url: &str,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String> {
        self.request(endpoint_url, system_prompt, user_text).await
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub run_id: Uuid,
    /// The command that was executed
    pub command: StructuredCommand,
    pub route: DispatchRoute,
}

impl ExecutionReport {
    /// Serialized envelope echoed back as confirmation
    pub fn confirmation(&self) -> String {
        self.command.confirmation()
    }
}

/// Success report or the first fatal error of a run
pub type ExecutionResult = Result<ExecutionReport>;

/// Wires completion, interpretation and dispatch together
pub struct Orchestrator {
    completion: Arc<dyn Completion>,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    pub fn new(completion: Arc<dyn Completion>, dispatcher: Dispatcher) -> Self {
        Self {
            completion,
            dispatcher,
        }
    }

    /// HTTP completion client and built-in catalog, configured from `config`
    pub fn from_config(config: &PilotConfig) -> Self {
        Self::new(
            Arc::new(CompletionClient::new(&config.completion)),
            Dispatcher::builtin(config.settle),
        )
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Translate `user_text` via the completion service and execute the result
    pub async fn run(
        &self,
        session: &EditorSession,
        user_text: &str,
        endpoint_url: &str,
    ) -> ExecutionResult {
        let lease = session.acquire().await;
        let run_id = Uuid::new_v4();

        async {
            info!(user_text, endpoint_url, "run started");
            let system_prompt = build_system_prompt(self.dispatcher.catalog());
            let raw = self
                .completion
                .complete(endpoint_url, &system_prompt, user_text)
                .await?;

            let command = interpret(&raw);
            let route = self.dispatcher.dispatch(lease.host(), &command).await?;
            info!(command = %command.command, ?route, degraded = command.is_degraded(), "run finished");

            Ok::<_, PilotError>(ExecutionReport {
                run_id,
                command,
                route,
            })
        }
        .instrument(info_span!("run", %run_id))
        .await
    }

    /// Execute an already structured command, skipping the model
    pub async fn execute(
        &self,
        session: &EditorSession,
        command: StructuredCommand,
    ) -> ExecutionResult {
        let lease = session.acquire().await;
        let run_id = Uuid::new_v4();

        async {
            let route = self.dispatcher.dispatch(lease.host(), &command).await?;
            info!(command = %command.command, ?route, "direct command finished");
            Ok::<_, PilotError>(ExecutionReport {
                run_id,
                command,
                route,
            })
        }
        .instrument(info_span!("direct", %run_id))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SettleDelays;
    use crate::editor::{EditorOp, Focus, HeadlessEditor};
    use std::sync::Mutex;

    /// Replies with canned text and records what it was asked
    struct CannedCompletion {
        reply: std::result::Result<String, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl CannedCompletion {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn transport_failure() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("connection refused".to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Completion for CannedCompletion {
        async fn complete(
            &self,
            endpoint_url: &str,
            system_prompt: &str,
            user_text: &str,
        ) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((endpoint_url.to_string(), user_text.to_string()));
            assert!(system_prompt.contains("goToLine"));
            self.reply.clone().map_err(PilotError::Transport)
        }
    }

    fn session_with(host: Arc<HeadlessEditor>) -> EditorSession {
        EditorSession::new(host)
    }

    #[tokio::test]
    async fn test_run_go_to_line() {
        let host = Arc::new(HeadlessEditor::new(["src/main.rs"]));
        host.open("src/main.rs").unwrap();
        let session = session_with(host.clone());
        let completion = CannedCompletion::ok(r#"{"command":"goToLine","parameters":{"line":25}}"#);
        let orchestrator = Orchestrator::new(
            completion.clone(),
            Dispatcher::builtin(SettleDelays::default()),
        );

        let report = orchestrator
            .run(&session, "go to line 25", "http://localhost:1234")
            .await
            .unwrap();

        assert_eq!(
            report.confirmation(),
            r#"{"command":"goToLine","parameters":{"line":25}}"#
        );
        assert_eq!(host.caret().unwrap().line, 24);
        assert_eq!(
            completion.seen.lock().unwrap().as_slice(),
            &[(
                "http://localhost:1234".to_string(),
                "go to line 25".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_before_dispatch() {
        let host = Arc::new(HeadlessEditor::default());
        let session = session_with(host.clone());
        let orchestrator = Orchestrator::new(
            CannedCompletion::transport_failure(),
            Dispatcher::builtin(SettleDelays::default()),
        );

        let err = orchestrator
            .run(&session, "open main", "http://localhost:1")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "TransportError");
        assert!(host.operations().is_empty());
    }

    #[tokio::test]
    async fn test_degraded_response_still_dispatches() {
        let host = Arc::new(HeadlessEditor::new(["unknown.txt"]));
        let session = session_with(host.clone());
        let orchestrator = Orchestrator::new(
            CannedCompletion::ok("Sorry, I cannot help with that."),
            Dispatcher::builtin(SettleDelays::default()),
        );

        let report = orchestrator
            .run(&session, "do something", "http://localhost:1234")
            .await
            .unwrap();

        assert!(report.command.is_degraded());
        assert_eq!(
            report.command.raw_response.as_deref(),
            Some("Sorry, I cannot help with that.")
        );
        assert!(host
            .operations()
            .contains(&EditorOp::Type("unknown".into())));
        assert_eq!(host.active_file().as_deref(), Some("unknown.txt"));
    }

    #[tokio::test]
    async fn test_degraded_response_without_matching_file_is_not_an_error() {
        let host = Arc::new(HeadlessEditor::new(["src/main.rs", "README.md"]));
        let session = session_with(host.clone());
        let orchestrator = Orchestrator::new(
            CannedCompletion::ok("Sorry, I cannot help with that."),
            Dispatcher::builtin(SettleDelays::default()),
        );

        let report = orchestrator
            .run(&session, "do something", "http://localhost:1234")
            .await
            .unwrap();

        assert!(report.command.is_degraded());
        assert_eq!(host.active_file(), None);
        assert_eq!(host.focus(), Focus::Editor);
    }

    #[tokio::test]
    async fn test_failed_run_does_not_poison_session() {
        let host = Arc::new(HeadlessEditor::new(["a.rs"]));
        let session = session_with(host.clone());
        let orchestrator = Orchestrator::new(
            CannedCompletion::ok(r#"{"command":"goToLine","parameters":{"line":3}}"#),
            Dispatcher::builtin(SettleDelays::default()),
        );

        let first = orchestrator.run(&session, "line 3", "http://x").await;
        assert_eq!(first.unwrap_err().kind(), "DispatchError");

        host.open("a.rs").unwrap();
        let second = orchestrator.run(&session, "line 3", "http://x").await;
        assert!(second.is_ok());
        assert_eq!(host.caret().unwrap().line, 2);
    }

    #[tokio::test]
    async fn test_execute_skips_completion() {
        let host = Arc::new(HeadlessEditor::default());
        let session = session_with(host.clone());
        let completion = CannedCompletion::ok("unused");
        let orchestrator = Orchestrator::new(
            completion.clone(),
            Dispatcher::builtin(SettleDelays::default()),
        );

        let report = orchestrator
            .execute(
                &session,
                StructuredCommand::with_params("togglePanel", Vec::<(String, _)>::new()),
            )
            .await
            .unwrap();

        assert_eq!(report.command.command, "togglePanel");
        assert!(host.panel_visible());
        assert!(completion.seen.lock().unwrap().is_empty());
    }
}
