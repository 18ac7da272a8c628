//! System prompt built from the live command catalog
//!
//! The prompt is regenerated from the same catalog the dispatcher resolves
//! against, so the commands the model is told about are exactly the commands
//! that have handlers.

use crate::command::catalog::{CommandCatalog, CommandSpec};
use std::fmt::Write;

const PREAMBLE: &str = "You translate natural-language instructions for a code editor into a single editor command.
Pick the command that best matches the instruction and fill in its parameters.
Line and column numbers are 1-based. Omit parameters the instruction does not mention.";

const OUTPUT_RULES: &str = r#"OUTPUT FORMAT (JSON only, no explanation, no code fences):
{"command": "<command id>", "parameters": {<name>: <string or integer>}, "description": "<short summary>"}

If the instruction names an editor command id that is not listed above, put that id in "command" unchanged."#;

/// Build the system prompt for `catalog`
pub fn build_system_prompt(catalog: &CommandCatalog) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nAVAILABLE COMMANDS:\n");
    for spec in catalog.iter() {
        describe_command(&mut prompt, spec);
    }

    prompt.push('\n');
    prompt.push_str(OUTPUT_RULES);

    prompt.push_str("\n\nExamples:\n");
    for spec in catalog.iter() {
        for example in spec.examples {
            let _ = writeln!(prompt, "\"{}\" -> {}", example.utterance, example.envelope);
        }
    }
    prompt
}

fn describe_command(prompt: &mut String, spec: &CommandSpec) {
    let params = if spec.parameter_names.is_empty() {
        "none".to_string()
    } else {
        spec.parameter_names.join(", ")
    };
    let _ = writeln!(
        prompt,
        "- {}: {} (parameters: {})",
        spec.id, spec.description, params
    );
}
