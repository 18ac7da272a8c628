//! The structured command envelope exchanged between interpretation and dispatch

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Command name used when the model output could not be interpreted
pub const DEGRADED_COMMAND: &str = "quickOpen";

/// Placeholder file name carried by the degraded default
pub const DEGRADED_FILE_NAME: &str = "unknown";

/// A named editor command with loosely typed parameters
///
/// `command` is ideally a catalog id but may be anything; unknown ids are
/// passed straight through to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredCommand {
    pub command: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Advisory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Original model text; present only on the degraded default
    #[serde(
        default,
        rename = "rawResponse",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_response: Option<String>,
}

impl StructuredCommand {
    pub fn new(command: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            parameters,
            description: None,
            raw_response: None,
        }
    }

    /// Build a command from `(key, value)` pairs
    pub fn with_params<I, K>(command: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let parameters = params.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(command, parameters)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The safe fallback substituted for uninterpretable model output
    pub fn degraded(raw_text: &str) -> Self {
        Self {
            command: DEGRADED_COMMAND.to_string(),
            parameters: Map::from_iter([(
                "fileName".to_string(),
                Value::String(DEGRADED_FILE_NAME.to_string()),
            )]),
            description: Some("Could not parse LLM response".to_string()),
            raw_response: Some(raw_text.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.raw_response.is_some()
    }

    /// Non-blank text parameter; numbers are rendered as text
    pub fn param_text(&self, key: &str) -> Option<String> {
        match self.parameters.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Integer parameter; accepts JSON numbers and numeric strings
    ///
    /// Fractional numbers truncate toward zero. Anything else reads as absent.
    pub fn param_int(&self, key: &str) -> Option<i64> {
        match self.parameters.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Parameters as a single editor-command argument, `None` when empty
    pub fn argument(&self) -> Option<Value> {
        (!self.parameters.is_empty()).then(|| Value::Object(self.parameters.clone()))
    }

    /// Serialized envelope used as the success confirmation
    pub fn confirmation(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.command.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_degraded_default_shape() {
        let cmd = StructuredCommand::degraded("no json here");
        assert_eq!(cmd.command, "quickOpen");
        assert_eq!(cmd.parameters.get("fileName"), Some(&json!("unknown")));
        assert_eq!(cmd.raw_response.as_deref(), Some("no json here"));
        assert!(cmd.is_degraded());
    }

    #[test]
    fn test_confirmation_omits_absent_fields() {
        let cmd = StructuredCommand::with_params("goToLine", [("line", json!(25))]);
        assert_eq!(
            cmd.confirmation(),
            r#"{"command":"goToLine","parameters":{"line":25}}"#
        );
    }

    #[test]
    fn test_confirmation_uses_camel_case_raw_response() {
        let cmd = StructuredCommand::degraded("oops");
        let value: Value = serde_json::from_str(&cmd.confirmation()).unwrap();
        assert_eq!(value["rawResponse"], json!("oops"));
    }

    #[test]
    fn test_param_int_tolerates_strings_and_floats() {
        let cmd = StructuredCommand::with_params(
            "goToLine",
            [
                ("a", json!(12)),
                ("b", json!(" 7 ")),
                ("c", json!(3.9)),
                ("d", json!("seven")),
                ("e", json!(true)),
            ],
        );
        assert_eq!(cmd.param_int("a"), Some(12));
        assert_eq!(cmd.param_int("b"), Some(7));
        assert_eq!(cmd.param_int("c"), Some(3));
        assert_eq!(cmd.param_int("d"), None);
        assert_eq!(cmd.param_int("e"), None);
        assert_eq!(cmd.param_int("missing"), None);
    }

    #[test]
    fn test_param_text_skips_blank() {
        let cmd = StructuredCommand::with_params(
            "rename",
            [("newName", json!("   ")), ("fileName", json!(" a.ts "))],
        );
        assert_eq!(cmd.param_text("newName"), None);
        assert_eq!(cmd.param_text("fileName").as_deref(), Some("a.ts"));
    }

    #[test]
    fn test_argument_empty_is_none() {
        let cmd = StructuredCommand::new("showCommands", Map::new());
        assert!(cmd.argument().is_none());
        let cmd = StructuredCommand::with_params("x", [("x", json!(1))]);
        assert_eq!(cmd.argument(), Some(json!({"x": 1})));
    }
}
