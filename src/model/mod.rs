//! Configuration model subsystem.
//!
//! # Data Flow
//! ```text
//! builder (parse time)
//!     → ModuleConfig::new(prefix)
//!     → add_* / set_* while walking documents
//!     → freeze() once, cascading to every owned object
//!     → shared via Arc<ModuleConfig> to the cache and router
//! ```
//!
//! # Design Decisions
//! - Mutable while parsing, read-only while serving: every setter returns
//!   `Result<(), FrozenError>` and checks the frozen flag first
//! - `Display` renders `TypeName[attr="value",flag=true]` in a fixed order
//! - All types are serde-serializable for the on-disk cache artifact

pub mod action;
pub mod controller;
pub mod data_source;
pub mod exception;
pub mod form_bean;
pub mod forward;
pub mod freeze;
pub mod message_resources;
pub mod module;
pub mod plug_in;
pub mod properties;

pub use action::ActionConfig;
pub use controller::ControllerConfig;
pub use data_source::DataSourceConfig;
pub use exception::ExceptionConfig;
pub use form_bean::{FormBeanConfig, FormPropertyConfig};
pub use forward::ForwardConfig;
pub use freeze::FrozenError;
pub use message_resources::MessageResourcesConfig;
pub use module::ModuleConfig;
pub use plug_in::PlugInConfig;
pub use properties::Properties;
