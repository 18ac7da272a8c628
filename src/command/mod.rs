//! Command pipeline back half
//!
//! Converts a StructuredCommand into editor operations:
//! StructuredCommand -> CommandCatalog -> HandlerRegistry -> CommandHandler -> EditorHost

pub mod catalog;
pub mod dispatcher;
pub mod envelope;
pub mod handlers;
pub mod position;

pub use catalog::{CommandCatalog, CommandExample, CommandSpec};
pub use dispatcher::{DispatchRoute, Dispatcher};
pub use envelope::StructuredCommand;
pub use handlers::{CommandHandler, HandlerContext, HandlerRegistry};
pub use position::{EditorPosition, ZeroBasedPosition};
