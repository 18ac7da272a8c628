//! Pipeline configuration with documented defaults
//!
//! Every timing value the handlers depend on lives here under a name.
//! Values load from TOML, with a couple of environment overrides layered on top.

use crate::core::error::{PilotError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Base URL of the completion service (scheme + host + port)
    ///
    /// The client appends `/v1/chat/completions` to this.
    pub endpoint_url: String,

    /// Completion request parameters
    pub completion: CompletionConfig,

    /// Settle-delays between dependent UI steps
    pub settle: SettleDelays,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:1234".to_string(),
            completion: CompletionConfig::default(),
            settle: SettleDelays::default(),
        }
    }
}

/// Request parameters sent with every completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Value of the `model` field
    pub model: String,

    /// Sampling temperature
    ///
    /// Kept low so the same instruction maps to the same command.
    pub temperature: f64,

    /// Output-token ceiling; a command envelope is small
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "local-model".to_string(),
            temperature: 0.1,
            max_tokens: 500,
        }
    }
}

/// Fixed synchronization gaps between UI steps, in milliseconds
///
/// The editor widgets give no programmatic "ready" signal, so each handler
/// waits this long before issuing the next dependent operation. Hosts that do
/// expose readiness may return earlier (see `EditorHost::wait_ready`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleDelays {
    /// Quick-open or command palette opened -> type into it
    pub palette_open_ms: u64,

    /// Text typed into quick-open -> accept the selected item
    ///
    /// The longest gap: the fuzzy file index has to filter first.
    pub filter_ms: u64,

    /// File accepted -> navigate inside the newly opened editor
    pub editor_open_ms: u64,

    /// Rename box opened -> type the new name
    pub rename_open_ms: u64,

    /// New name typed -> accept the rename
    pub rename_type_ms: u64,

    /// Search view opened with a query -> report done
    pub search_open_ms: u64,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            palette_open_ms: 200,
            filter_ms: 500,
            editor_open_ms: 300,
            rename_open_ms: 300,
            rename_type_ms: 100,
            search_open_ms: 300,
        }
    }
}

impl SettleDelays {
    pub fn palette_open(&self) -> Duration {
        Duration::from_millis(self.palette_open_ms)
    }

    pub fn filter(&self) -> Duration {
        Duration::from_millis(self.filter_ms)
    }

    pub fn editor_open(&self) -> Duration {
        Duration::from_millis(self.editor_open_ms)
    }

    pub fn rename_open(&self) -> Duration {
        Duration::from_millis(self.rename_open_ms)
    }

    pub fn rename_type(&self) -> Duration {
        Duration::from_millis(self.rename_type_ms)
    }

    pub fn search_open(&self) -> Duration {
        Duration::from_millis(self.search_open_ms)
    }

    fn named(&self) -> [(&'static str, u64); 6] {
        [
            ("palette_open_ms", self.palette_open_ms),
            ("filter_ms", self.filter_ms),
            ("editor_open_ms", self.editor_open_ms),
            ("rename_open_ms", self.rename_open_ms),
            ("rename_type_ms", self.rename_type_ms),
            ("search_open_ms", self.search_open_ms),
        ]
    }
}

impl PilotConfig {
    /// Parse a config from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PilotConfig =
            toml::from_str(content).map_err(|e| PilotError::Config(e.to_string()))?;
        config.validate().map_err(PilotError::Config)?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Layer PILOT_ENDPOINT_URL / PILOT_MODEL over this config
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("PILOT_ENDPOINT_URL") {
            self.endpoint_url = url;
        }
        if let Ok(model) = std::env::var("PILOT_MODEL") {
            self.completion.model = model;
        }
        self.validate().map_err(PilotError::Config)?;
        Ok(self)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let url = self.endpoint_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!(
                "endpoint_url ({}) must use the http or https scheme",
                self.endpoint_url
            ));
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(format!(
                "completion.temperature ({}) must be within 0.0..=2.0",
                self.completion.temperature
            ));
        }

        if self.completion.max_tokens == 0 {
            return Err("completion.max_tokens must be positive".into());
        }

        // Open before type, type before accept: every gap must be non-zero
        for (name, ms) in self.settle.named() {
            if ms == 0 {
                return Err(format!("settle.{} must be greater than zero", name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PilotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion.model, "local-model");
        assert_eq!(config.completion.max_tokens, 500);
        assert!((config.completion.temperature - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PilotConfig::from_toml_str(
            r#"
endpoint_url = "https://llm.internal:8443"

[settle]
filter_ms = 750
"#,
        )
        .unwrap();
        assert_eq!(config.endpoint_url, "https://llm.internal:8443");
        assert_eq!(config.settle.filter_ms, 750);
        assert_eq!(config.settle.palette_open_ms, 200);
        assert_eq!(config.completion.model, "local-model");
    }

    #[test]
    fn test_zero_settle_rejected() {
        let result = PilotConfig::from_toml_str("[settle]\nrename_type_ms = 0\n");
        match result {
            Err(PilotError::Config(msg)) => assert!(msg.contains("rename_type_ms")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_scheme_rejected() {
        let mut config = PilotConfig::default();
        config.endpoint_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_range() {
        let mut config = PilotConfig::default();
        config.completion.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = PilotConfig::from_toml_str("endpoint_url = [");
        assert!(matches!(result, Err(PilotError::Config(_))));
    }

    #[test]
    fn test_settle_durations() {
        let settle = SettleDelays::default();
        assert_eq!(settle.filter(), Duration::from_millis(500));
        assert_eq!(settle.rename_type(), Duration::from_millis(100));
    }
}
