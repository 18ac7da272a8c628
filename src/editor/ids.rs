//! Editor command ids issued by the handlers

pub const QUICK_OPEN: &str = "workbench.action.quickOpen";
pub const ACCEPT_QUICK_OPEN: &str = "workbench.action.acceptSelectedQuickOpenItem";
pub const GOTO_LINE: &str = "workbench.action.gotoLine";
pub const PREVIOUS_EDITOR: &str = "workbench.action.openPreviousRecentlyUsedEditor";
pub const FIND_IN_FILES: &str = "workbench.action.findInFiles";
pub const SHOW_COMMANDS: &str = "workbench.action.showCommands";
pub const REVEAL_DEFINITION: &str = "editor.action.revealDefinition";
pub const RENAME: &str = "editor.action.rename";
pub const ACCEPT_RENAME: &str = "acceptRenameInput";
pub const TOGGLE_SIDEBAR: &str = "workbench.action.toggleSidebarVisibility";
pub const TOGGLE_PANEL: &str = "workbench.action.togglePanel";
