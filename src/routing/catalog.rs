//! Configured modules and their source documents.
//!
//! # Design Decisions
//! - The prefix → sources table is swapped atomically on reload; readers take
//!   a snapshot and never block
//! - Loading a module always goes through the cache

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use arc_swap::ArcSwap;
use crate::cache::{CacheError, ModuleConfigCache};
use crate::model::ModuleConfig;
use crate::routing::error::RoutingError;
use crate::routing::matcher;

pub type ModuleTable = BTreeMap<String, Vec<PathBuf>>;

pub struct ModuleCatalog {
    modules: ArcSwap<ModuleTable>,
    cache: Arc<ModuleConfigCache>,
}

impl ModuleCatalog {
    pub fn new(cache: Arc<ModuleConfigCache>, modules: impl IntoIterator<Item = (String, Vec<PathBuf>)>) -> Self {
        Self {
            modules: ArcSwap::new(Arc::new(modules.into_iter().collect())),
            cache,
        }
    }

    /// Replace the module table.
    pub fn replace(&self, modules: impl IntoIterator<Item = (String, Vec<PathBuf>)>) {
        let table: ModuleTable = modules.into_iter().collect();
        tracing::info!(modules = table.len(), "Module catalog replaced");
        self.modules.store(Arc::new(table));
    }

    pub fn snapshot(&self) -> Arc<ModuleTable> {
        self.modules.load_full()
    }

    pub fn cache(&self) -> &Arc<ModuleConfigCache> {
        &self.cache
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.modules.load().contains_key(prefix)
    }

    pub fn prefixes(&self) -> Vec<String> {
        self.modules.load().keys().cloned().collect()
    }

    /// Prefix of the module owning `path`; `""` when none is more specific.
    pub fn select_module(&self, path: &str) -> String {
        let modules = self.modules.load();
        matcher::select_module(path, modules.keys().map(String::as_str)).to_string()
    }

    /// Frozen configuration for `prefix`.
    pub fn module(&self, prefix: &str) -> Result<Arc<ModuleConfig>, RoutingError> {
        let sources = self
            .modules
            .load()
            .get(prefix)
            .cloned()
            .ok_or_else(|| RoutingError::ModuleNotFound {
                prefix: prefix.to_string(),
            })?;
        Ok(self.cache.module(prefix, &sources)?)
    }

    /// Load every configured module, reporting each outcome.
    pub fn warm(&self) -> Vec<(String, Result<Arc<ModuleConfig>, CacheError>)> {
        let modules = self.snapshot();
        modules
            .iter()
            .map(|(prefix, sources)| (prefix.clone(), self.cache.module(prefix, sources)))
            .collect()
    }
}
