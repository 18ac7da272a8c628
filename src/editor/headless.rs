//! In-memory editor host
//!
//! Simulates the editor surfaces the handlers drive (quick-open, rename box,
//! search view, sidebar, panel, one active document) and records every
//! operation it receives. The CLI runs against it as a dry-run host; the test
//! suite uses it to observe what a handler chain actually did.

use super::{ids, EditorHost, UiSurface};
use crate::command::position::ZeroBasedPosition;
use crate::core::error::EditorError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Line count assumed for files added without one
pub const DEFAULT_LINE_COUNT: u32 = 500;

/// Lines visible at once
pub const VIEWPORT_LINES: u32 = 40;

/// One recorded host operation
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOp {
    Execute {
        command: String,
        args: Option<Value>,
    },
    Type(String),
    Reveal(ZeroBasedPosition),
    Inform(String),
    /// Surface waited on and the fallback delay the handler asked for
    Settle(UiSurface, Duration),
}

/// Which widget currently receives typed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Editor,
    QuickOpen { filter: String },
    CommandPalette { filter: String },
    RenameInput { text: String, untouched: bool },
    SearchView,
}

#[derive(Debug, Clone)]
struct WorkspaceFile {
    path: String,
    line_count: u32,
}

#[derive(Debug, Clone)]
struct OpenDocument {
    path: String,
    line_count: u32,
    caret: ZeroBasedPosition,
    viewport_top: u32,
    inserted: String,
}

#[derive(Debug)]
struct HeadlessState {
    files: Vec<WorkspaceFile>,
    active: Option<OpenDocument>,
    /// Most recent first, excluding the active document
    recent: Vec<String>,
    focus: Focus,
    search_query: Option<String>,
    sidebar_visible: bool,
    panel_visible: bool,
    extra_commands: HashSet<String>,
    renames: Vec<String>,
    definition_requests: usize,
    notifications: Vec<String>,
    log: Vec<EditorOp>,
}

/// Dry-run editor host backed by plain data
#[derive(Debug)]
pub struct HeadlessEditor {
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessEditor {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl HeadlessEditor {
    /// A workspace with the given file paths and nothing open
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files = files
            .into_iter()
            .map(|path| WorkspaceFile {
                path: path.into(),
                line_count: DEFAULT_LINE_COUNT,
            })
            .collect();
        Self {
            state: Mutex::new(HeadlessState {
                files,
                active: None,
                recent: Vec::new(),
                focus: Focus::Editor,
                search_query: None,
                sidebar_visible: true,
                panel_visible: false,
                extra_commands: HashSet::new(),
                renames: Vec::new(),
                definition_requests: 0,
                notifications: Vec::new(),
                log: Vec::new(),
            }),
        }
    }

    /// Add a file with a known line count
    pub fn with_file(self, path: impl Into<String>, line_count: u32) -> Self {
        self.lock().files.push(WorkspaceFile {
            path: path.into(),
            line_count: line_count.max(1),
        });
        self
    }

    /// Accept an extra command id (e.g. one contributed by an extension)
    pub fn with_command(self, command: impl Into<String>) -> Self {
        self.lock().extra_commands.insert(command.into());
        self
    }

    /// Open a workspace file directly, as if the user had clicked it
    pub fn open(&self, path: &str) -> Result<(), EditorError> {
        let mut state = self.lock();
        let file = state
            .files
            .iter()
            .find(|f| f.path == path)
            .cloned()
            .ok_or_else(|| EditorError::NoMatch(path.to_string()))?;
        state.open_document(file);
        Ok(())
    }

    pub fn operations(&self) -> Vec<EditorOp> {
        self.lock().log.clone()
    }

    pub fn clear_operations(&self) {
        self.lock().log.clear();
    }

    pub fn active_file(&self) -> Option<String> {
        self.lock().active.as_ref().map(|d| d.path.clone())
    }

    pub fn caret(&self) -> Option<ZeroBasedPosition> {
        self.lock().active.as_ref().map(|d| d.caret)
    }

    /// Whether a 0-based line is inside the active document's viewport
    pub fn is_line_visible(&self, line: u32) -> bool {
        self.lock()
            .active
            .as_ref()
            .is_some_and(|d| line >= d.viewport_top && line < d.viewport_top + VIEWPORT_LINES)
    }

    pub fn focus(&self) -> Focus {
        self.lock().focus.clone()
    }

    pub fn search_query(&self) -> Option<String> {
        self.lock().search_query.clone()
    }

    pub fn sidebar_visible(&self) -> bool {
        self.lock().sidebar_visible
    }

    pub fn panel_visible(&self) -> bool {
        self.lock().panel_visible
    }

    pub fn renames(&self) -> Vec<String> {
        self.lock().renames.clone()
    }

    pub fn definition_requests(&self) -> usize {
        self.lock().definition_requests
    }

    pub fn notifications(&self) -> Vec<String> {
        self.lock().notifications.clone()
    }

    /// Text typed straight into the active document
    pub fn inserted_text(&self) -> Option<String> {
        self.lock().active.as_ref().map(|d| d.inserted.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HeadlessState {
    fn open_document(&mut self, file: WorkspaceFile) {
        if let Some(previous) = self.active.take() {
            if previous.path != file.path {
                self.recent.retain(|p| p != &previous.path);
                self.recent.insert(0, previous.path);
            }
        }
        self.recent.retain(|p| p != &file.path);
        self.active = Some(OpenDocument {
            path: file.path,
            line_count: file.line_count,
            caret: ZeroBasedPosition::default(),
            viewport_top: 0,
            inserted: String::new(),
        });
        self.focus = Focus::Editor;
    }

    fn require_active(&self) -> Result<(), EditorError> {
        self.active
            .as_ref()
            .map(|_| ())
            .ok_or(EditorError::NoActiveEditor)
    }

    fn run(&mut self, command: &str, args: Option<&Value>) -> Result<Value, EditorError> {
        match command {
            ids::QUICK_OPEN => {
                let filter = args
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                self.focus = Focus::QuickOpen { filter };
                Ok(Value::Null)
            }
            ids::ACCEPT_QUICK_OPEN => {
                let Focus::QuickOpen { filter } = self.focus.clone() else {
                    return Err(EditorError::CommandFailed {
                        command: command.to_string(),
                        message: "quick open is not visible".to_string(),
                    });
                };
                self.focus = Focus::Editor;
                // Accepting an empty result list just closes the picker
                let Some(file) = best_match(&self.files, &filter).cloned() else {
                    return Ok(Value::Null);
                };
                let path = file.path.clone();
                self.open_document(file);
                Ok(Value::String(path))
            }
            ids::GOTO_LINE => {
                self.focus = Focus::QuickOpen {
                    filter: ":".to_string(),
                };
                Ok(Value::Null)
            }
            ids::PREVIOUS_EDITOR => {
                let Some(path) = self.recent.first().cloned() else {
                    return Ok(Value::Null);
                };
                if let Some(file) = self.files.iter().find(|f| f.path == path).cloned() {
                    self.open_document(file);
                }
                Ok(Value::String(path))
            }
            ids::FIND_IN_FILES => {
                self.search_query = args
                    .and_then(|a| a.get("query"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.sidebar_visible = true;
                self.focus = Focus::SearchView;
                Ok(Value::Null)
            }
            ids::SHOW_COMMANDS => {
                self.focus = Focus::CommandPalette {
                    filter: ">".to_string(),
                };
                Ok(Value::Null)
            }
            ids::REVEAL_DEFINITION => {
                self.require_active()?;
                self.definition_requests += 1;
                Ok(Value::Null)
            }
            ids::RENAME => {
                self.require_active()?;
                self.focus = Focus::RenameInput {
                    text: "symbol".to_string(),
                    untouched: true,
                };
                Ok(Value::Null)
            }
            ids::ACCEPT_RENAME => {
                let Focus::RenameInput { text, .. } = self.focus.clone() else {
                    return Err(EditorError::CommandFailed {
                        command: command.to_string(),
                        message: "rename input is not visible".to_string(),
                    });
                };
                self.renames.push(text);
                self.focus = Focus::Editor;
                Ok(Value::Null)
            }
            ids::TOGGLE_SIDEBAR => {
                self.sidebar_visible = !self.sidebar_visible;
                Ok(Value::Bool(self.sidebar_visible))
            }
            ids::TOGGLE_PANEL => {
                self.panel_visible = !self.panel_visible;
                Ok(Value::Bool(self.panel_visible))
            }
            other if self.extra_commands.contains(other) => Ok(Value::Null),
            other => Err(EditorError::UnknownCommand(other.to_string())),
        }
    }

    fn type_into_focus(&mut self, text: &str) -> Result<(), EditorError> {
        match &mut self.focus {
            Focus::QuickOpen { filter } | Focus::CommandPalette { filter } => {
                filter.push_str(text);
                Ok(())
            }
            Focus::RenameInput { text: current, untouched } => {
                // The proposed name starts selected, so the first input replaces it
                if *untouched {
                    current.clear();
                    *untouched = false;
                }
                current.push_str(text);
                Ok(())
            }
            Focus::SearchView => {
                self.search_query
                    .get_or_insert_with(String::new)
                    .push_str(text);
                Ok(())
            }
            Focus::Editor => {
                let doc = self.active.as_mut().ok_or(EditorError::NoActiveEditor)?;
                doc.inserted.push_str(text);
                Ok(())
            }
        }
    }

    fn reveal(&mut self, position: ZeroBasedPosition) -> Result<(), EditorError> {
        let doc = self.active.as_mut().ok_or(EditorError::NoActiveEditor)?;
        let line = position.line.min(doc.line_count.saturating_sub(1));
        doc.caret = ZeroBasedPosition::new(line, position.character);
        if line < doc.viewport_top || line >= doc.viewport_top + VIEWPORT_LINES {
            doc.viewport_top = line.saturating_sub(VIEWPORT_LINES / 2);
        }
        self.focus = Focus::Editor;
        Ok(())
    }
}

/// Pick the file quick-open would select for `filter`
///
/// Ranking: exact file name, file name prefix, file name substring, path
/// substring, then in-order subsequence of the path. Case-insensitive.
fn best_match<'a>(files: &'a [WorkspaceFile], filter: &str) -> Option<&'a WorkspaceFile> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    files
        .iter()
        .filter_map(|file| match_rank(&file.path, &needle).map(|rank| (rank, file)))
        .min_by_key(|(rank, file)| (*rank, file.path.len()))
        .map(|(_, file)| file)
}

fn match_rank(path: &str, needle: &str) -> Option<u8> {
    let path = path.to_lowercase();
    let name = path.rsplit(['/', '\\']).next().unwrap_or(&path);

    if name == needle {
        Some(0)
    } else if name.starts_with(needle) {
        Some(1)
    } else if name.contains(needle) {
        Some(2)
    } else if path.contains(needle) {
        Some(3)
    } else if is_subsequence(needle, &path) {
        Some(4)
    } else {
        None
    }
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle
        .chars()
        .filter(|c| !c.is_whitespace())
        .all(|n| chars.any(|h| h == n))
}

#[async_trait]
impl EditorHost for HeadlessEditor {
    async fn execute_command(
        &self,
        command: &str,
        args: Option<&Value>,
    ) -> Result<Value, EditorError> {
        let mut state = self.lock();
        state.log.push(EditorOp::Execute {
            command: command.to_string(),
            args: args.cloned(),
        });
        state.run(command, args)
    }

    async fn type_text(&self, text: &str) -> Result<(), EditorError> {
        let mut state = self.lock();
        state.log.push(EditorOp::Type(text.to_string()));
        state.type_into_focus(text)
    }

    async fn reveal_position(&self, position: ZeroBasedPosition) -> Result<(), EditorError> {
        let mut state = self.lock();
        state.log.push(EditorOp::Reveal(position));
        state.reveal(position)
    }

    async fn show_information(&self, text: &str) -> Result<(), EditorError> {
        let mut state = self.lock();
        state.log.push(EditorOp::Inform(text.to_string()));
        state.notifications.push(text.to_string());
        Ok(())
    }

    /// Widgets here are ready immediately; the wait is only recorded
    async fn wait_ready(&self, surface: UiSurface, fallback: Duration) {
        self.lock().log.push(EditorOp::Settle(surface, fallback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workspace() -> HeadlessEditor {
        HeadlessEditor::new([
            "src/App.tsx",
            "src/test.tsx",
            "src/components/test.tsx.snap",
            "README.md",
        ])
    }

    #[test]
    fn test_best_match_prefers_exact_name() {
        let editor = workspace();
        let state = editor.lock();
        let file = best_match(&state.files, "test.tsx").unwrap();
        assert_eq!(file.path, "src/test.tsx");
    }

    #[test]
    fn test_best_match_subsequence() {
        let editor = workspace();
        let state = editor.lock();
        assert_eq!(best_match(&state.files, "rdme").unwrap().path, "README.md");
        assert!(best_match(&state.files, "zzz").is_none());
        assert!(best_match(&state.files, "  ").is_none());
    }

    #[tokio::test]
    async fn test_quick_open_type_accept_opens_file() {
        let editor = workspace();
        editor
            .execute_command(ids::QUICK_OPEN, None)
            .await
            .unwrap();
        editor.type_text("app").await.unwrap();
        let opened = editor
            .execute_command(ids::ACCEPT_QUICK_OPEN, None)
            .await
            .unwrap();
        assert_eq!(opened, json!("src/App.tsx"));
        assert_eq!(editor.active_file().as_deref(), Some("src/App.tsx"));
        assert_eq!(editor.focus(), Focus::Editor);
    }

    #[tokio::test]
    async fn test_accept_without_match_closes_picker() {
        let editor = workspace();
        editor.open("README.md").unwrap();
        editor
            .execute_command(ids::QUICK_OPEN, None)
            .await
            .unwrap();
        editor.type_text("nothing-like-this").await.unwrap();
        let result = editor.execute_command(ids::ACCEPT_QUICK_OPEN, None).await;
        assert_eq!(result, Ok(Value::Null));
        assert_eq!(editor.focus(), Focus::Editor);
        assert_eq!(editor.active_file().as_deref(), Some("README.md"));
    }

    #[tokio::test]
    async fn test_accept_outside_quick_open_fails() {
        let editor = workspace();
        let result = editor.execute_command(ids::ACCEPT_QUICK_OPEN, None).await;
        assert!(matches!(result, Err(EditorError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_typing_in_editor_inserts_into_document() {
        let editor = workspace();
        assert_eq!(editor.type_text("x").await, Err(EditorError::NoActiveEditor));

        editor.open("src/App.tsx").unwrap();
        editor.type_text("let a = 1;").await.unwrap();
        assert_eq!(editor.inserted_text().as_deref(), Some("let a = 1;"));
    }

    #[tokio::test]
    async fn test_reveal_requires_active_editor() {
        let editor = workspace();
        let result = editor.reveal_position(ZeroBasedPosition::new(3, 0)).await;
        assert_eq!(result, Err(EditorError::NoActiveEditor));
    }

    #[tokio::test]
    async fn test_reveal_clamps_and_scrolls() {
        let editor = HeadlessEditor::default().with_file("lib.rs", 120);
        editor.open("lib.rs").unwrap();
        editor
            .reveal_position(ZeroBasedPosition::new(400, 2))
            .await
            .unwrap();
        assert_eq!(editor.caret(), Some(ZeroBasedPosition::new(119, 2)));
        assert!(editor.is_line_visible(119));
        assert!(!editor.is_line_visible(0));
    }

    #[tokio::test]
    async fn test_recent_file_returns_previous() {
        let editor = workspace();
        editor.open("README.md").unwrap();
        editor.open("src/App.tsx").unwrap();
        editor
            .execute_command(ids::PREVIOUS_EDITOR, None)
            .await
            .unwrap();
        assert_eq!(editor.active_file().as_deref(), Some("README.md"));
    }

    #[tokio::test]
    async fn test_rename_replaces_proposed_name() {
        let editor = workspace();
        editor.open("src/App.tsx").unwrap();
        editor.execute_command(ids::RENAME, None).await.unwrap();
        editor.type_text("fetchUser").await.unwrap();
        editor
            .execute_command(ids::ACCEPT_RENAME, None)
            .await
            .unwrap();
        assert_eq!(editor.renames(), vec!["fetchUser".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_command_rejected_but_logged() {
        let editor = workspace();
        let result = editor
            .execute_command("notInCatalog", Some(&json!({"x": 1})))
            .await;
        assert_eq!(
            result,
            Err(EditorError::UnknownCommand("notInCatalog".into()))
        );
        assert_eq!(
            editor.operations(),
            vec![EditorOp::Execute {
                command: "notInCatalog".into(),
                args: Some(json!({"x": 1})),
            }]
        );
    }

    #[tokio::test]
    async fn test_extra_command_accepted() {
        let editor = workspace().with_command("myExtension.doThing");
        assert!(editor
            .execute_command("myExtension.doThing", None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_toggles_flip_visibility() {
        let editor = workspace();
        assert!(editor.sidebar_visible());
        editor
            .execute_command(ids::TOGGLE_SIDEBAR, None)
            .await
            .unwrap();
        assert!(!editor.sidebar_visible());
        editor
            .execute_command(ids::TOGGLE_PANEL, None)
            .await
            .unwrap();
        assert!(editor.panel_visible());
    }
}
