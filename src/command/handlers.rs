//! Execution handlers: short timed state machines over editor operations
//!
//! Each handler proceeds optimistically: it issues one operation, waits for
//! the next surface to settle, and issues the next. Any operation's failure
//! propagates immediately. A missing optional parameter ends the chain early
//! at a point that leaves the editor in a sensible state for manual input.

use crate::command::catalog::handler_ids;
use crate::command::envelope::StructuredCommand;
use crate::command::position::EditorPosition;
use crate::core::config::SettleDelays;
use crate::core::error::EditorError;
use crate::editor::{ids, EditorHost, UiSurface};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// What a handler runs against
pub struct HandlerContext<'a> {
    pub host: &'a dyn EditorHost,
    pub settle: &'a SettleDelays,
}

impl HandlerContext<'_> {
    async fn settle(&self, surface: UiSurface, delay: Duration) {
        debug!(?surface, ?delay, "settling");
        self.host.wait_ready(surface, delay).await;
    }

    async fn run(&self, command: &str, args: Option<&serde_json::Value>) -> Result<(), EditorError> {
        debug!(command, "editor command");
        self.host.execute_command(command, args).await.map(|_| ())
    }

    async fn type_text(&self, text: &str) -> Result<(), EditorError> {
        debug!(text, "typing");
        self.host.type_text(text).await
    }

    async fn reveal(&self, position: EditorPosition) -> Result<(), EditorError> {
        let target = position.to_zero_based();
        debug!(line = target.line, character = target.character, "revealing");
        self.host.reveal_position(target).await
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Parameter keys this handler reads
    fn parameters(&self) -> &'static [&'static str];

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        command: &StructuredCommand,
    ) -> Result<(), EditorError>;
}

/// Optional 1-based (line, column) from a command; column defaults to 1
fn requested_position(command: &StructuredCommand) -> Option<EditorPosition> {
    let line = command.param_int("line")?;
    let column = command.param_int("column").unwrap_or(1);
    Some(EditorPosition::new(line, column))
}

/// Open a file through quick-open, then optionally move inside it
pub struct QuickOpenHandler;

#[async_trait]
impl CommandHandler for QuickOpenHandler {
    fn parameters(&self) -> &'static [&'static str] {
        &["fileName", "line", "column"]
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        command: &StructuredCommand,
    ) -> Result<(), EditorError> {
        ctx.run(ids::QUICK_OPEN, None).await?;
        ctx.settle(UiSurface::QuickOpen, ctx.settle.palette_open()).await;

        // No name: leave the picker open for the user
        let Some(file_name) = command.param_text("fileName") else {
            return Ok(());
        };
        ctx.type_text(&file_name).await?;
        ctx.settle(UiSurface::QuickOpenResults, ctx.settle.filter())
            .await;
        ctx.run(ids::ACCEPT_QUICK_OPEN, None).await?;

        if let Some(position) = requested_position(command) {
            ctx.settle(UiSurface::ActiveEditor, ctx.settle.editor_open())
                .await;
            ctx.reveal(position).await?;
        }
        Ok(())
    }
}

/// Move the caret in the active editor
pub struct GoToLineHandler;

#[async_trait]
impl CommandHandler for GoToLineHandler {
    fn parameters(&self) -> &'static [&'static str] {
        &["line", "column"]
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        command: &StructuredCommand,
    ) -> Result<(), EditorError> {
        match requested_position(command) {
            Some(position) => ctx.reveal(position).await,
            // No usable line: open the go-to-line prompt instead
            None => ctx.run(ids::GOTO_LINE, None).await,
        }
    }
}

/// Workspace-wide text search
pub struct FindInFilesHandler;

#[async_trait]
impl CommandHandler for FindInFilesHandler {
    fn parameters(&self) -> &'static [&'static str] {
        &["searchTerm"]
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        command: &StructuredCommand,
    ) -> Result<(), EditorError> {
        let args = command
            .param_text("searchTerm")
            .map(|term| json!({ "query": term }));
        ctx.run(ids::FIND_IN_FILES, args.as_ref()).await?;
        ctx.settle(UiSurface::SearchView, ctx.settle.search_open())
            .await;
        Ok(())
    }
}

/// Filter quick-open by name without accepting anything
pub struct FindFilesByNameHandler;

#[async_trait]
impl CommandHandler for FindFilesByNameHandler {
    fn parameters(&self) -> &'static [&'static str] {
        &["fileName", "filePattern"]
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        command: &StructuredCommand,
    ) -> Result<(), EditorError> {
        ctx.run(ids::QUICK_OPEN, None).await?;
        ctx.settle(UiSurface::QuickOpen, ctx.settle.palette_open()).await;

        let pattern = command
            .param_text("fileName")
            .or_else(|| command.param_text("filePattern"));
        if let Some(pattern) = pattern {
            ctx.type_text(&pattern).await?;
        }
        Ok(())
    }
}

/// Rename the symbol at the caret
pub struct RenameHandler;

#[async_trait]
impl CommandHandler for RenameHandler {
    fn parameters(&self) -> &'static [&'static str] {
        &["newName"]
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        command: &StructuredCommand,
    ) -> Result<(), EditorError> {
        ctx.run(ids::RENAME, None).await?;
        ctx.settle(UiSurface::RenameInput, ctx.settle.rename_open())
            .await;

        // No name: the rename box stays open for manual input
        let Some(new_name) = command.param_text("newName") else {
            return Ok(());
        };
        ctx.type_text(&new_name).await?;
        ctx.settle(UiSurface::RenameEdit, ctx.settle.rename_type())
            .await;
        ctx.run(ids::ACCEPT_RENAME, None).await
    }
}

/// A parameterless intent that maps onto one editor command
pub struct EditorCommandHandler {
    command: &'static str,
}

impl EditorCommandHandler {
    pub const fn new(command: &'static str) -> Self {
        Self { command }
    }
}

#[async_trait]
impl CommandHandler for EditorCommandHandler {
    fn parameters(&self) -> &'static [&'static str] {
        &[]
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        _command: &StructuredCommand,
    ) -> Result<(), EditorError> {
        ctx.run(self.command, None).await
    }
}

/// Handler lookup by handler id
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for every built-in catalog entry
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(handler_ids::QUICK_OPEN, QuickOpenHandler)
            .register(handler_ids::GO_TO_LINE, GoToLineHandler)
            .register(handler_ids::FIND_IN_FILES, FindInFilesHandler)
            .register(handler_ids::FIND_FILES_BY_NAME, FindFilesByNameHandler)
            .register(handler_ids::RENAME, RenameHandler)
            .register(
                handler_ids::RECENT_FILE,
                EditorCommandHandler::new(ids::PREVIOUS_EDITOR),
            )
            .register(
                handler_ids::SHOW_COMMANDS,
                EditorCommandHandler::new(ids::SHOW_COMMANDS),
            )
            .register(
                handler_ids::GO_TO_DEFINITION,
                EditorCommandHandler::new(ids::REVEAL_DEFINITION),
            )
            .register(
                handler_ids::TOGGLE_SIDEBAR,
                EditorCommandHandler::new(ids::TOGGLE_SIDEBAR),
            )
            .register(
                handler_ids::TOGGLE_PANEL,
                EditorCommandHandler::new(ids::TOGGLE_PANEL),
            );
        registry
    }

    /// Add or replace a handler
    pub fn register(
        &mut self,
        handler_id: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> &mut Self {
        self.handlers.insert(handler_id.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, handler_id: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(handler_id).cloned()
    }

    pub fn contains(&self, handler_id: &str) -> bool {
        self.handlers.contains_key(handler_id)
    }
}
