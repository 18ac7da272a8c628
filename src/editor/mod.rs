//! Boundary to the live editor
//!
//! Handlers never touch an editor directly: they issue operations through
//! `EditorHost`, and a run holds an `EditorSession` lease for its whole
//! handler chain so two runs never interleave on the same UI widgets.

pub mod headless;
pub mod ids;

use crate::command::position::ZeroBasedPosition;
use crate::core::error::EditorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

pub use headless::{EditorOp, Focus, HeadlessEditor};

/// Lower bound for any settle wait
pub const MIN_SETTLE: Duration = Duration::from_millis(1);

/// UI surfaces a handler waits on between dependent steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurface {
    /// Quick-open picker has been opened
    QuickOpen,
    /// Quick-open has filtered on typed text
    QuickOpenResults,
    /// A file was accepted and its editor is opening
    ActiveEditor,
    /// Rename box has been opened
    RenameInput,
    /// New name has been typed into the rename box
    RenameEdit,
    /// Search view has been opened with a query
    SearchView,
}

/// Operations the pipeline needs from an editor
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Run an editor command by id with an optional single argument
    async fn execute_command(
        &self,
        command: &str,
        args: Option<&Value>,
    ) -> Result<Value, EditorError>;

    /// Synthetic text input into whichever widget has focus
    async fn type_text(&self, text: &str) -> Result<(), EditorError>;

    /// Select the position in the active editor and scroll it into view
    async fn reveal_position(&self, position: ZeroBasedPosition) -> Result<(), EditorError>;

    /// Show an informational notification
    async fn show_information(&self, text: &str) -> Result<(), EditorError>;

    /// Wait until `surface` can accept the next operation
    ///
    /// Hosts without a readiness signal keep this default, a fixed sleep.
    async fn wait_ready(&self, surface: UiSurface, fallback: Duration) {
        let _ = surface;
        tokio::time::sleep(fallback.max(MIN_SETTLE)).await;
    }
}

/// One editor session with serialised access
pub struct EditorSession {
    host: Arc<dyn EditorHost>,
    gate: Mutex<()>,
}

/// Exclusive use of a session; released on drop
pub struct SessionLease<'a> {
    host: &'a dyn EditorHost,
    _guard: MutexGuard<'a, ()>,
}

impl EditorSession {
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self {
            host,
            gate: Mutex::new(()),
        }
    }

    /// Wait for any in-flight run to finish, then take the session
    pub async fn acquire(&self) -> SessionLease<'_> {
        let guard = self.gate.lock().await;
        SessionLease {
            host: self.host.as_ref(),
            _guard: guard,
        }
    }

    /// Take the session only if no run holds it
    pub fn try_acquire(&self) -> Option<SessionLease<'_>> {
        let guard = self.gate.try_lock().ok()?;
        Some(SessionLease {
            host: self.host.as_ref(),
            _guard: guard,
        })
    }

    pub fn host(&self) -> Arc<dyn EditorHost> {
        Arc::clone(&self.host)
    }
}

impl<'a> SessionLease<'a> {
    pub fn host(&self) -> &'a dyn EditorHost {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    struct SleepyHost {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EditorHost for SleepyHost {
        async fn execute_command(
            &self,
            _command: &str,
            _args: Option<&Value>,
        ) -> Result<Value, EditorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        }

        async fn type_text(&self, _text: &str) -> Result<(), EditorError> {
            Ok(())
        }

        async fn reveal_position(&self, _position: ZeroBasedPosition) -> Result<(), EditorError> {
            Ok(())
        }

        async fn show_information(&self, _text: &str) -> Result<(), EditorError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_wait_ready_sleeps_for_fallback() {
        let host = SleepyHost {
            calls: AtomicUsize::new(0),
        };
        let start = Instant::now();
        host.wait_ready(UiSurface::QuickOpen, Duration::from_millis(200))
            .await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_wait_ready_enforces_minimum_gap() {
        let host = SleepyHost {
            calls: AtomicUsize::new(0),
        };
        let start = Instant::now();
        host.wait_ready(UiSurface::RenameEdit, Duration::ZERO).await;
        assert!(start.elapsed() >= MIN_SETTLE);
    }

    #[tokio::test]
    async fn test_session_lease_is_exclusive() {
        let session = EditorSession::new(Arc::new(SleepyHost {
            calls: AtomicUsize::new(0),
        }));
        let lease = session.acquire().await;
        assert!(session.try_acquire().is_none());
        lease.host().execute_command("x", None).await.unwrap();
        drop(lease);
        assert!(session.try_acquire().is_some());
    }
}
