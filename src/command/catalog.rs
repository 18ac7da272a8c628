//! Command catalog: recognized intents and their parameter contracts
//!
//! The table is plain data. Adding an intent that reuses an existing handler is
//! a new `CommandSpec` entry, not new branching in the dispatcher.

use crate::core::error::{PilotError, Result};
use std::collections::HashMap;

/// Handler ids referenced by the built-in catalog
pub mod handler_ids {
    pub const QUICK_OPEN: &str = "quick_open";
    pub const RECENT_FILE: &str = "recent_file";
    pub const GO_TO_LINE: &str = "go_to_line";
    pub const FIND_IN_FILES: &str = "find_in_files";
    pub const FIND_FILES_BY_NAME: &str = "find_files_by_name";
    pub const SHOW_COMMANDS: &str = "show_commands";
    pub const GO_TO_DEFINITION: &str = "go_to_definition";
    pub const RENAME: &str = "rename";
    pub const TOGGLE_SIDEBAR: &str = "toggle_sidebar";
    pub const TOGGLE_PANEL: &str = "toggle_panel";
}

/// One worked example shown to the model: an instruction and the envelope it should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandExample {
    pub utterance: &'static str,
    pub envelope: &'static str,
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Unique key the model emits as `command`
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Recognized parameter keys, in prompt order
    pub parameter_names: &'static [&'static str],
    /// Key into the handler registry
    pub handler_id: &'static str,
    pub examples: &'static [CommandExample],
}

const fn example(utterance: &'static str, envelope: &'static str) -> CommandExample {
    CommandExample {
        utterance,
        envelope,
    }
}

const BUILTIN: &[CommandSpec] = &[
    CommandSpec {
        id: "quickOpen",
        display_name: "Quick Open",
        description: "Open a file by fuzzy name, optionally jumping to a line and column in it",
        parameter_names: &["fileName", "line", "column"],
        handler_id: handler_ids::QUICK_OPEN,
        examples: &[
            example(
                "open file test.tsx",
                r#"{"command": "quickOpen", "parameters": {"fileName": "test.tsx"}, "description": "Open test.tsx"}"#,
            ),
            example(
                "open main.rs at line 40",
                r#"{"command": "quickOpen", "parameters": {"fileName": "main.rs", "line": 40}, "description": "Open main.rs at line 40"}"#,
            ),
        ],
    },
    CommandSpec {
        id: "recentFile",
        display_name: "Recent File",
        description: "Reopen the most recently used file",
        parameter_names: &[],
        handler_id: handler_ids::RECENT_FILE,
        examples: &[example(
            "go back to the previous file",
            r#"{"command": "recentFile", "parameters": {}, "description": "Reopen the most recent file"}"#,
        )],
    },
    CommandSpec {
        id: "goToLine",
        display_name: "Go to Line",
        description: "Move the caret to a line (and optional column) in the current file",
        parameter_names: &["line", "column"],
        handler_id: handler_ids::GO_TO_LINE,
        examples: &[
            example(
                "go to line 25",
                r#"{"command": "goToLine", "parameters": {"line": 25}, "description": "Go to line 25"}"#,
            ),
            example(
                "jump to line 10 column 4",
                r#"{"command": "goToLine", "parameters": {"line": 10, "column": 4}, "description": "Go to line 10, column 4"}"#,
            ),
        ],
    },
    CommandSpec {
        id: "findInFiles",
        display_name: "Find in Files",
        description: "Full-text search across the workspace",
        parameter_names: &["searchTerm"],
        handler_id: handler_ids::FIND_IN_FILES,
        examples: &[example(
            "search for useEffect everywhere",
            r#"{"command": "findInFiles", "parameters": {"searchTerm": "useEffect"}, "description": "Search the workspace for useEffect"}"#,
        )],
    },
    CommandSpec {
        id: "findFilesByName",
        display_name: "Find Files by Name",
        description: "List files matching a name or pattern without opening one",
        parameter_names: &["fileName", "filePattern"],
        handler_id: handler_ids::FIND_FILES_BY_NAME,
        examples: &[example(
            "find all the test files",
            r#"{"command": "findFilesByName", "parameters": {"filePattern": ".test."}, "description": "Find test files"}"#,
        )],
    },
    CommandSpec {
        id: "showCommands",
        display_name: "Show Commands",
        description: "Open the command palette",
        parameter_names: &[],
        handler_id: handler_ids::SHOW_COMMANDS,
        examples: &[example(
            "show me all commands",
            r#"{"command": "showCommands", "parameters": {}, "description": "Open the command palette"}"#,
        )],
    },
    CommandSpec {
        id: "goToDefinition",
        display_name: "Go to Definition",
        description: "Jump to the definition of the symbol under the caret",
        parameter_names: &[],
        handler_id: handler_ids::GO_TO_DEFINITION,
        examples: &[example(
            "where is this defined",
            r#"{"command": "goToDefinition", "parameters": {}, "description": "Go to definition"}"#,
        )],
    },
    CommandSpec {
        id: "rename",
        display_name: "Rename Symbol",
        description: "Rename the symbol under the caret; without newName the rename box stays open",
        parameter_names: &["newName"],
        handler_id: handler_ids::RENAME,
        examples: &[
            example(
                "rename this to fetchUser",
                r#"{"command": "rename", "parameters": {"newName": "fetchUser"}, "description": "Rename symbol to fetchUser"}"#,
            ),
            example(
                "rename this symbol",
                r#"{"command": "rename", "parameters": {}, "description": "Start renaming the symbol"}"#,
            ),
        ],
    },
    CommandSpec {
        id: "toggleSidebar",
        display_name: "Toggle Sidebar",
        description: "Show or hide the sidebar",
        parameter_names: &[],
        handler_id: handler_ids::TOGGLE_SIDEBAR,
        examples: &[example(
            "hide the sidebar",
            r#"{"command": "toggleSidebar", "parameters": {}, "description": "Toggle the sidebar"}"#,
        )],
    },
    CommandSpec {
        id: "togglePanel",
        display_name: "Toggle Panel",
        description: "Show or hide the bottom panel (terminal, output, problems)",
        parameter_names: &[],
        handler_id: handler_ids::TOGGLE_PANEL,
        examples: &[example(
            "open the terminal panel",
            r#"{"command": "togglePanel", "parameters": {}, "description": "Toggle the panel"}"#,
        )],
    },
];

/// Read-only lookup table of command specs, built once at startup
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    entries: Vec<CommandSpec>,
    index: HashMap<&'static str, usize>,
}

impl CommandCatalog {
    /// The built-in editor intents
    pub fn builtin() -> Self {
        // Built-in ids are unique; covered by test_builtin_ids_unique
        let index = BUILTIN
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.id, i))
            .collect();
        Self {
            entries: BUILTIN.to_vec(),
            index,
        }
    }

    /// Build a catalog from custom specs, rejecting duplicate ids
    pub fn from_specs(specs: Vec<CommandSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.insert(spec.id, i).is_some() {
                return Err(PilotError::Config(format!(
                    "duplicate command id '{}' in catalog",
                    spec.id
                )));
            }
        }
        Ok(Self {
            entries: specs,
            index,
        })
    }

    pub fn lookup(&self, command_id: &str) -> Option<&CommandSpec> {
        self.index.get(command_id).map(|&i| &self.entries[i])
    }

    /// Entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_unique() {
        let ids: HashSet<_> = BUILTIN.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), BUILTIN.len());
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let catalog = CommandCatalog::builtin();
        let spec = catalog.lookup("goToLine").unwrap();
        assert_eq!(spec.parameter_names, &["line", "column"]);
        assert_eq!(spec.handler_id, handler_ids::GO_TO_LINE);
        assert!(catalog.lookup("notInCatalog").is_none());
        assert!(catalog.lookup("gotoline").is_none());
    }

    #[test]
    fn test_lookup_is_order_independent() {
        let catalog = CommandCatalog::builtin();
        let first = catalog.lookup("rename").cloned();
        let _ = catalog.lookup("quickOpen");
        let _ = catalog.lookup("missing");
        assert_eq!(catalog.lookup("rename").cloned(), first);
    }

    #[test]
    fn test_required_intents_present() {
        let catalog = CommandCatalog::builtin();
        for id in [
            "quickOpen",
            "recentFile",
            "goToLine",
            "findInFiles",
            "findFilesByName",
            "showCommands",
            "goToDefinition",
            "rename",
            "toggleSidebar",
            "togglePanel",
        ] {
            assert!(catalog.lookup(id).is_some(), "missing {}", id);
        }
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_every_entry_has_a_parseable_example() {
        for spec in CommandCatalog::builtin().iter() {
            assert!(!spec.examples.is_empty(), "{} has no example", spec.id);
            for ex in spec.examples {
                let value: serde_json::Value = serde_json::from_str(ex.envelope).unwrap();
                assert_eq!(value["command"], spec.id);
            }
        }
    }

    #[test]
    fn test_from_specs_rejects_duplicates() {
        let spec = BUILTIN[0].clone();
        let result = CommandCatalog::from_specs(vec![spec.clone(), spec]);
        assert!(matches!(result, Err(PilotError::Config(_))));
    }
}
