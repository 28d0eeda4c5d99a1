//! Startup orchestration.
//!
//! # Responsibilities
//! - Wire builder, cache, catalog and router from validated settings
//! - Optionally warm every module before serving
//!
//! # Design Decisions
//! - Fail fast: invalid settings stop startup
//! - Subsystems initialize in dependency order, not concurrently
//! - Warming reports per-module failures instead of aborting on the first

use std::path::PathBuf;
use std::sync::Arc;
use crate::action::HandlerRegistry;
use crate::builder::{ConfigBuilder, ConfigClassRegistry};
use crate::cache::ModuleConfigCache;
use crate::config::{EngineConfig, ValidationError};
use crate::routing::{DispatchRouter, ModuleCatalog};

/// The assembled dispatch engine.
pub struct Engine {
    pub cache: Arc<ModuleConfigCache>,
    pub catalog: Arc<ModuleCatalog>,
    pub router: DispatchRouter,
}

impl Engine {
    /// Assemble the engine with the built-in config classes.
    pub fn from_config(config: &EngineConfig, handlers: HandlerRegistry) -> Result<Self, ValidationError> {
        Self::with_classes(config, ConfigClassRegistry::default(), handlers)
    }

    pub fn with_classes(
        config: &EngineConfig,
        classes: ConfigClassRegistry,
        handlers: HandlerRegistry,
    ) -> Result<Self, ValidationError> {
        let builder = Arc::new(ConfigBuilder::with_classes(classes));
        let cache = Arc::new(
            ModuleConfigCache::new(PathBuf::from(&config.cache.dir), builder)
                .serve_stale_on_error(config.cache.serve_stale_on_error),
        );
        let catalog = Arc::new(ModuleCatalog::new(cache.clone(), config.module_sources()));
        let router = DispatchRouter::new(catalog.clone(), handlers, config.dispatch.clone())?;

        tracing::info!(
            modules = config.modules.len(),
            cache_dir = %config.cache.dir,
            mapping = %config.dispatch.mapping,
            "Engine assembled"
        );
        Ok(Self { cache, catalog, router })
    }

    /// Load every module; returns the number that failed.
    pub fn warm(&self) -> usize {
        let mut failed = 0;
        for (prefix, result) in self.catalog.warm() {
            match result {
                Ok(module) => tracing::info!(
                    prefix = %prefix,
                    actions = module.action_configs().count(),
                    "Module ready"
                ),
                Err(e) => {
                    failed += 1;
                    tracing::error!(prefix = %prefix, error = %e, "Module failed to load");
                }
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleSourceConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_engine_from_config_and_warm() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.xml");
        let bad = dir.path().join("bad.xml");
        fs::write(&good, r#"<module-config><action-mappings><action path="/a" forward="/a.jsp"/></action-mappings></module-config>"#).unwrap();
        fs::write(&bad, "<module-config/>").unwrap();

        let mut config = EngineConfig::default();
        config.cache.dir = dir.path().join("cache").display().to_string();
        config.modules = vec![
            ModuleSourceConfig { prefix: String::new(), files: vec![good.display().to_string()] },
            ModuleSourceConfig { prefix: "/broken".into(), files: vec![bad.display().to_string()] },
        ];

        let engine = Engine::from_config(&config, HandlerRegistry::new()).unwrap();
        assert_eq!(engine.warm(), 1);
        assert!(engine.catalog.contains("/broken"));
    }
}
