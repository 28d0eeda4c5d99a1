//! Action handlers.
//!
//! # Data Flow
//! ```text
//! router
//!     → registry.rs (handler type → instance, once per module)
//!     → ActionHandler::execute(mapping, form, request, response)
//!     → Some(ActionForward)  → router resolves the destination
//!     → None                 → handler completed the response
//! ```
//!
//! # Design Decisions
//! - One trait, free-standing variants; no handler hierarchy
//! - Operations are registered closures looked up by name
//! - Handler errors pass through the router unmodified

pub mod compact;
pub mod dispatch;
pub mod forward;
pub mod registry;
pub mod single;
pub mod switch;
pub mod types;

use crate::http::{Request, Response};
use crate::model::ActionConfig;

pub use compact::CompactAction;
pub use dispatch::{missing_hook, DispatchAction, MissingHook};
pub use forward::ForwardAction;
pub use registry::{factory, HandlerContext, HandlerFactory, HandlerRegistry};
pub use single::FnAction;
pub use switch::SwitchAction;
pub use types::{operation, ActionError, ActionForm, ActionForward, ActionResult, Operation};

/// The invocation contract shared by every handler.
///
/// Instances are shared across concurrent requests.
pub trait ActionHandler: Send + Sync {
    /// Handle one request. `Ok(None)` means the response is complete.
    fn execute(
        &self,
        mapping: &ActionConfig,
        form: Option<&ActionForm>,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> ActionResult;
}
