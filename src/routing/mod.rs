//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, parameters)
//!     → catalog.rs (select module by longest prefix, load via cache)
//!     → matcher.rs (strip request mapping → action path)
//!     → router.rs (find action, bind form, invoke handler)
//!     → Return: forward destination, completed response, or error
//! ```
//!
//! # Design Decisions
//! - Module configurations are frozen and shared, so lookups take no locks
//! - No regex in hot path (prefix and extension matching only)
//! - Deterministic: same input always matches same action
//! - Every error maps to a status class (not found, bad request, internal)

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod router;

pub use catalog::{ModuleCatalog, ModuleTable};
pub use error::{DispatchError, RoutingError, StatusClass};
pub use matcher::{parse_mapping, select_module, PathMapping};
pub use router::{find_action, resolve_forward, DispatchOutcome, DispatchRouter};
