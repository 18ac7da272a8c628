//! Language-model side of the pipeline
//!
//! Free text -> system prompt + CompletionClient -> raw text -> interpret -> StructuredCommand

pub mod client;
pub mod interpreter;
pub mod prompt;

pub use client::CompletionClient;
pub use interpreter::interpret;
pub use prompt::build_system_prompt;
