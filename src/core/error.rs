use thiserror::Error;

/// Failures reported by an editor host while carrying out an operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("No active editor")]
    NoActiveEditor,

    #[error("Command '{0}' not found")]
    UnknownCommand(String),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("No item matches '{0}'")]
    NoMatch(String),
}

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Dispatch of '{command}' failed: {source}")]
    Dispatch {
        command: String,
        #[source]
        source: EditorError,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PilotError {
    /// Stable taxonomy name reported to the presentation shell
    pub fn kind(&self) -> &'static str {
        match self {
            PilotError::Transport(_) => "TransportError",
            PilotError::Protocol(_) => "ProtocolError",
            PilotError::Decode(_) => "DecodeError",
            PilotError::Dispatch { .. } => "DispatchError",
            PilotError::Config(_) => "ConfigError",
            PilotError::Io(_) => "IoError",
        }
    }

    pub fn dispatch(command: impl Into<String>, source: EditorError) -> Self {
        PilotError::Dispatch {
            command: command.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(PilotError::Transport("x".into()).kind(), "TransportError");
        assert_eq!(PilotError::Protocol("x".into()).kind(), "ProtocolError");
        assert_eq!(PilotError::Decode("x".into()).kind(), "DecodeError");
        assert_eq!(
            PilotError::dispatch("goToLine", EditorError::NoActiveEditor).kind(),
            "DispatchError"
        );
    }

    #[test]
    fn test_dispatch_display_includes_source() {
        let err = PilotError::dispatch("goToLine", EditorError::NoActiveEditor);
        assert_eq!(err.to_string(), "Dispatch of 'goToLine' failed: No active editor");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PilotError = io.into();
        assert_eq!(err.kind(), "IoError");
    }
}
