//! Interpret free-text model output as a structured command
//!
//! Models are told to answer with the bare JSON envelope, but they wrap it in
//! prose, code fences, or emit stray `{}` fragments. Interpretation never
//! fails: when no envelope can be recovered, the degraded default command is
//! returned carrying the original text.

use crate::command::envelope::StructuredCommand;
use serde_json::{Deserializer, Map, Value};
use tracing::{debug, warn};

/// Interpret raw completion text
///
/// Every `{` in the text is tried as the start of a JSON value. The objects
/// that parse are ranked by length, largest first, and the first one with a
/// non-empty string `command` wins.
pub fn interpret(raw_text: &str) -> StructuredCommand {
    for candidate in candidates(raw_text) {
        if let Some(command) = parse_envelope(candidate) {
            debug!(command = %command.command, "interpreted model response");
            return command;
        }
    }

    warn!(
        response_len = raw_text.len(),
        "could not interpret model response, using degraded default"
    );
    StructuredCommand::degraded(raw_text)
}

/// JSON objects embedded in `text`, largest first
///
/// Nested objects are candidates too, so an envelope wrapped in an outer
/// object without a `command` is still found.
fn candidates(text: &str) -> Vec<Map<String, Value>> {
    let mut found: Vec<(usize, Map<String, Value>)> = text
        .match_indices('{')
        .filter_map(|(start, _)| object_at(&text[start..]))
        .collect();

    // Stable sort keeps earlier objects first among equal lengths
    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.into_iter().map(|(_, object)| object).collect()
}

/// The JSON object at the start of `text` and its length in bytes
fn object_at(text: &str) -> Option<(usize, Map<String, Value>)> {
    let mut stream = Deserializer::from_str(text).into_iter::<Value>();
    match stream.next()? {
        Ok(Value::Object(object)) => Some((stream.byte_offset(), object)),
        _ => None,
    }
}

/// Accept a candidate if it is an envelope-shaped JSON object
fn parse_envelope(mut object: Map<String, Value>) -> Option<StructuredCommand> {
    let command = object.get("command")?.as_str()?.trim();
    if command.is_empty() {
        return None;
    }

    let command = command.to_string();

    let parameters = match object.remove("parameters") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => return None,
    };

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(StructuredCommand {
        command,
        parameters,
        description,
        raw_response: None,
    })
}
