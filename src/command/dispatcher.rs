//! Command dispatch - resolves a structured command to a handler and runs it
//!
//! Resolution: catalog entry -> registered handler. Commands the catalog does
//! not know, and catalog entries whose handler is not registered, are passed
//! straight through to the editor's command API.

use crate::command::catalog::CommandCatalog;
use crate::command::envelope::StructuredCommand;
use crate::command::handlers::{HandlerContext, HandlerRegistry};
use crate::core::config::SettleDelays;
use crate::core::error::{PilotError, Result};
use crate::editor::EditorHost;
use std::sync::Arc;
use tracing::{debug, warn};

/// How a command was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRoute {
    /// A catalog handler ran
    Handler(&'static str),
    /// The command id went to the editor verbatim
    PassThrough,
}

/// Resolves and executes structured commands against an editor host
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<CommandCatalog>,
    handlers: HandlerRegistry,
    settle: SettleDelays,
}

impl Dispatcher {
    pub fn new(catalog: Arc<CommandCatalog>, handlers: HandlerRegistry, settle: SettleDelays) -> Self {
        Self {
            catalog,
            handlers,
            settle,
        }
    }

    /// Built-in catalog and handlers
    pub fn builtin(settle: SettleDelays) -> Self {
        Self::new(
            Arc::new(CommandCatalog::builtin()),
            HandlerRegistry::builtin(),
            settle,
        )
    }

    pub fn catalog(&self) -> &Arc<CommandCatalog> {
        &self.catalog
    }

    /// Which route `command` would take, without running anything
    pub fn route(&self, command: &str) -> DispatchRoute {
        match self.catalog.lookup(command) {
            Some(spec) if self.handlers.contains(spec.handler_id) => {
                DispatchRoute::Handler(spec.handler_id)
            }
            _ => DispatchRoute::PassThrough,
        }
    }

    /// Execute one command
    ///
    /// Editor failures come back as `PilotError::Dispatch` naming the command.
    pub async fn dispatch(
        &self,
        host: &dyn EditorHost,
        command: &StructuredCommand,
    ) -> Result<DispatchRoute> {
        let route = self.route(&command.command);
        let handler = match route {
            DispatchRoute::Handler(id) => self.handlers.get(id),
            DispatchRoute::PassThrough => None,
        };

        match handler {
            Some(handler) => {
                debug!(command = %command.command, ?route, "dispatching to handler");
                let ctx = HandlerContext {
                    host,
                    settle: &self.settle,
                };
                handler
                    .handle(&ctx, command)
                    .await
                    .map_err(|e| PilotError::dispatch(&command.command, e))?;
            }
            None => {
                warn!(command = %command.command, "not in catalog, passing through");
                let args = command.argument();
                host.execute_command(&command.command, args.as_ref())
                    .await
                    .map_err(|e| PilotError::dispatch(&command.command, e))?;
            }
        }

        Ok(route)
    }
}
