//! Engine settings schema.
//!
//! All types derive Serde traits for deserialization from a TOML file.
//! Every section has defaults so a file listing only `[[modules]]` is valid.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Root settings for the dispatch engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Module cache settings.
    pub cache: CacheConfig,

    /// Request mapping and handler parameter names.
    pub dispatch: DispatchConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Module prefixes and their source documents.
    pub modules: Vec<ModuleSourceConfig>,
}

impl EngineConfig {
    /// Prefix → source files, in declaration order.
    pub fn module_sources(&self) -> impl Iterator<Item = (String, Vec<PathBuf>)> + '_ {
        self.modules
            .iter()
            .map(|m| (m.prefix.clone(), m.files.iter().map(PathBuf::from).collect()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one artifact per module.
    pub dir: String,

    /// Keep serving the previous configuration when a rebuild fails.
    pub serve_stale_on_error: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".action-router/cache".to_string(),
            serve_stale_on_error: false,
        }
    }
}

/// Parameter names are configuration, not wire constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Request mapping: extension (`*.do`) or path prefix (`/do/*`).
    pub mapping: String,

    /// Module switch: target page parameter.
    pub page_param: String,

    /// Module switch: target module parameter.
    pub prefix_param: String,

    /// Convention dispatch: operation parameter.
    pub action_param: String,

    /// Convention dispatch: prefix prepended to the capitalized operation.
    pub method_prefix: String,

    /// Presence of this parameter marks a cancelled submission.
    pub cancel_param: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mapping: "*.do".to_string(),
            page_param: "page".to_string(),
            prefix_param: "prefix".to_string(),
            action_param: "action".to_string(),
            method_prefix: "do".to_string(),
            cancel_param: "cancel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Start the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

/// One module: its prefix (`""` for the default module) and documents.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModuleSourceConfig {
    #[serde(default)]
    pub prefix: String,
    pub files: Vec<String>,
}
