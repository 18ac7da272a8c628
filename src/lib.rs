//! Editor Pilot - natural-language control of a code editor
//!
//! Free text goes to an OpenAI-compatible completion service together with a
//! system prompt generated from the command catalog. The model's answer is
//! interpreted as a structured command and executed against an editor host
//! through short, timed handler chains.

pub mod command;
pub mod core;
pub mod editor;
pub mod llm;
pub mod orchestrator;
pub mod shell;
