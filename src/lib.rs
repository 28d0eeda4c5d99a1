//! Config-driven action routing and dispatch engine.

pub mod action;
pub mod builder;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod routing;

pub use builder::ConfigBuilder;
pub use cache::ModuleConfigCache;
pub use config::schema::EngineConfig;
pub use lifecycle::Engine;
pub use model::ModuleConfig;
pub use routing::{DispatchRouter, ModuleCatalog};
