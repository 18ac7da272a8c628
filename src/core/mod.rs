pub mod config;
pub mod error;

pub use config::{CompletionConfig, PilotConfig, SettleDelays};
pub use error::{EditorError, PilotError, Result};
