//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load settings → Validate → Build cache, catalog, router → Warm modules
//!
//! Reload (reload.rs):
//!     Source change → prefix from watcher → cache lookup rebuilds the module
//! ```
//!
//! # Design Decisions
//! - Ordered startup: settings first, then cache, then router
//! - Reload work runs off the async runtime (file I/O is blocking)

pub mod reload;
pub mod startup;

pub use reload::run_reloader;
pub use startup::Engine;
