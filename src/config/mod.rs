//! Engine settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//!     → modules feed the catalog, dispatch feeds the handlers
//!
//! On module document change:
//!     watcher.rs detects change
//!     → sends the affected prefix
//!     → cache lookup rebuilds the stale module eagerly
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, SettingsError};
pub use schema::{CacheConfig, DispatchConfig, EngineConfig, ModuleSourceConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
