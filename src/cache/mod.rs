//! Module configuration cache.
//!
//! # Data Flow
//! ```text
//! module(prefix, sources)
//!     → per-prefix lock
//!     → stat sources (newest mtime)
//!     → memo fresh?      → shared Arc
//!     → artifact fresh?  → deserialize, memoize
//!     → otherwise        → build all sources, freeze, persist atomically
//! ```
//!
//! # Design Decisions
//! - Staleness is judged against the build time recorded before the build
//!   started, so an edit landing mid-build triggers another rebuild later
//! - The lock is held across check, build, freeze and persist; different
//!   prefixes never contend
//! - A config is fresh only for the exact source list it was built from;
//!   adding, dropping or reordering documents forces a rebuild
//! - Rebuild failures are returned unless `serve_stale_on_error` is set and a
//!   previous configuration is memoized or still decodable on disk

pub mod artifact;
pub mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use dashmap::DashMap;
use parking_lot::Mutex;
use crate::builder::ConfigBuilder;
use crate::model::ModuleConfig;
use crate::observability::metrics;

pub use artifact::{artifact_path, cache_identity, Envelope, FORMAT_VERSION};
pub use error::CacheError;

/// Where a lookup's configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// In-memory copy from an earlier lookup.
    Memo,
    /// Deserialized from the on-disk artifact.
    Artifact,
    /// Built from the source documents.
    Rebuilt,
    /// Rebuild failed; the previous configuration was served instead.
    Stale,
}

impl Lookup {
    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::Memo => "memo",
            Lookup::Artifact => "artifact",
            Lookup::Rebuilt => "rebuilt",
            Lookup::Stale => "stale",
        }
    }
}

#[derive(Debug, Clone)]
struct Memo {
    built_at: SystemTime,
    sources: Vec<PathBuf>,
    config: Arc<ModuleConfig>,
}

/// Maps module prefixes to frozen configurations.
pub struct ModuleConfigCache {
    cache_dir: PathBuf,
    builder: Arc<ConfigBuilder>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    memo: DashMap<String, Memo>,
    serve_stale_on_error: bool,
}

impl ModuleConfigCache {
    pub fn new(cache_dir: impl Into<PathBuf>, builder: Arc<ConfigBuilder>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            builder,
            locks: DashMap::new(),
            memo: DashMap::new(),
            serve_stale_on_error: false,
        }
    }

    /// Serve the last good configuration when a rebuild fails.
    pub fn serve_stale_on_error(mut self, enabled: bool) -> Self {
        self.serve_stale_on_error = enabled;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Frozen configuration for `prefix`, rebuilt from `sources` when stale.
    pub fn module(&self, prefix: &str, sources: &[PathBuf]) -> Result<Arc<ModuleConfig>, CacheError> {
        self.lookup(prefix, sources).map(|(config, _)| config)
    }

    /// Like [`module`](Self::module), also reporting where the result came from.
    pub fn lookup(&self, prefix: &str, sources: &[PathBuf]) -> Result<(Arc<ModuleConfig>, Lookup), CacheError> {
        let lock = self.lock_for(prefix);
        let _guard = lock.lock();

        let result = self.lookup_locked(prefix, sources);
        match &result {
            Ok((_, outcome)) => metrics::record_cache_lookup(prefix, outcome.as_str()),
            Err(_) => metrics::record_cache_lookup(prefix, "error"),
        }
        result
    }

    /// Drop the memoized configuration and the artifact for `prefix`.
    pub fn invalidate(&self, prefix: &str) -> Result<(), CacheError> {
        let lock = self.lock_for(prefix);
        let _guard = lock.lock();

        self.memo.remove(prefix);
        artifact::remove(&artifact_path(&self.cache_dir, prefix), prefix)?;
        tracing::info!(prefix, "Module cache invalidated");
        Ok(())
    }

    fn lock_for(&self, prefix: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(prefix.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn lookup_locked(&self, prefix: &str, sources: &[PathBuf]) -> Result<(Arc<ModuleConfig>, Lookup), CacheError> {
        let newest = newest_mtime(prefix, sources)?;
        let is_fresh = |built_at: SystemTime, built_from: &[PathBuf]| {
            built_from == sources && newest.map_or(true, |mtime| mtime <= built_at)
        };

        if let Some(memo) = self.memo.get(prefix) {
            if is_fresh(memo.built_at, &memo.sources) {
                tracing::trace!(prefix, "Module served from memory");
                return Ok((memo.config.clone(), Lookup::Memo));
            }
        }

        let path = artifact_path(&self.cache_dir, prefix);
        let previous = match artifact::load(&path, prefix) {
            Some(envelope) if is_fresh(envelope.built_at, &envelope.sources) => {
                tracing::debug!(prefix, path = %path.display(), "Module loaded from cache artifact");
                return Ok((self.remember(prefix, envelope), Lookup::Artifact));
            }
            Some(envelope) => {
                tracing::info!(prefix, "Module sources changed since last build");
                Some(envelope)
            }
            None => None,
        };

        match self.rebuild(prefix, sources, &path) {
            Ok(config) => Ok((config, Lookup::Rebuilt)),
            Err(e) if self.serve_stale_on_error => {
                if let Some(memo) = self.memo.get(prefix) {
                    tracing::warn!(prefix, error = %e, "Rebuild failed, serving previous configuration");
                    return Ok((memo.config.clone(), Lookup::Stale));
                }
                if let Some(envelope) = previous {
                    tracing::warn!(prefix, error = %e, path = %path.display(), "Rebuild failed, serving stale cache artifact");
                    return Ok((self.remember(prefix, envelope), Lookup::Stale));
                }
                tracing::error!(prefix, error = %e, "Module rebuild failed with nothing to fall back on");
                Err(e)
            }
            Err(e) => {
                tracing::error!(prefix, error = %e, "Module rebuild failed");
                Err(e)
            }
        }
    }

    /// Freeze a decoded artifact and keep it as the in-memory copy.
    fn remember(&self, prefix: &str, envelope: Envelope) -> Arc<ModuleConfig> {
        let mut config = envelope.config;
        config.freeze();
        let config = Arc::new(config);
        self.memo.insert(
            prefix.to_string(),
            Memo {
                built_at: envelope.built_at,
                sources: envelope.sources,
                config: config.clone(),
            },
        );
        config
    }

    fn rebuild(&self, prefix: &str, sources: &[PathBuf], path: &Path) -> Result<Arc<ModuleConfig>, CacheError> {
        artifact::ensure_writable(&self.cache_dir, path, prefix)?;

        let built_at = SystemTime::now();
        let mut config = self.builder.build(prefix, sources)?;
        config.freeze();

        let envelope = Envelope {
            format_version: FORMAT_VERSION,
            prefix: prefix.to_string(),
            sources: sources.to_vec(),
            built_at,
            config,
        };
        artifact::store(path, &envelope)?;
        metrics::record_rebuild(prefix);

        let config = Arc::new(envelope.config);
        self.memo.insert(
            prefix.to_string(),
            Memo {
                built_at,
                sources: envelope.sources,
                config: config.clone(),
            },
        );
        tracing::info!(prefix, sources = sources.len(), path = %path.display(), "Module rebuilt and cached");
        Ok(config)
    }
}

fn newest_mtime(prefix: &str, sources: &[PathBuf]) -> Result<Option<SystemTime>, CacheError> {
    let mut newest = None;
    for path in sources {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|source| CacheError::SourceUnreadable {
                prefix: prefix.to_string(),
                path: path.clone(),
                source,
            })?;
        newest = newest.max(Some(modified));
    }
    Ok(newest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    const DOC: &str = r#"<module-config>
  <action-mappings>
    <action path="/home" forward="/index.jsp"/>
  </action-mappings>
</module-config>"#;

    fn setup() -> (TempDir, PathBuf, ModuleConfigCache) {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("module.xml");
        fs::write(&source, DOC).unwrap();
        let cache = ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new()));
        (dir, source, cache)
    }

    fn touch(path: &Path, ahead: Duration) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + ahead).unwrap();
    }

    #[test]
    fn test_first_lookup_builds_and_persists() {
        let (dir, source, cache) = setup();
        let (config, outcome) = cache.lookup("", &[source]).unwrap();

        assert_eq!(outcome, Lookup::Rebuilt);
        assert!(config.is_frozen());
        assert!(dir.path().join("cache/default.module.json").exists());
    }

    #[test]
    fn test_repeated_lookup_reuses_instance() {
        let (_dir, source, cache) = setup();
        let sources = vec![source];
        let first = cache.module("", &sources).unwrap();
        let (second, outcome) = cache.lookup("", &sources).unwrap();

        assert_eq!(outcome, Lookup::Memo);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_fresh_artifact_is_loaded_by_new_cache() {
        let (dir, source, cache) = setup();
        let sources = vec![source];
        let built = cache.module("", &sources).unwrap();

        let other = ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new()));
        let (loaded, outcome) = other.lookup("", &sources).unwrap();
        assert_eq!(outcome, Lookup::Artifact);
        assert_eq!(*loaded, *built);
        assert!(loaded.is_frozen());
    }

    #[test]
    fn test_touched_source_triggers_rebuild() {
        let (_dir, source, cache) = setup();
        let sources = vec![source.clone()];
        cache.module("", &sources).unwrap();

        touch(&source, Duration::from_secs(5));
        let (_, outcome) = cache.lookup("", &sources).unwrap();
        assert_eq!(outcome, Lookup::Rebuilt);
    }

    #[test]
    fn test_missing_source_is_unreadable() {
        let (dir, _source, cache) = setup();
        let err = cache.module("", &[dir.path().join("gone.xml")]).unwrap_err();
        assert!(matches!(err, CacheError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_build_failure_propagates_unless_serving_stale() {
        let (dir, source, cache) = setup();
        let sources = vec![source.clone()];
        cache.module("", &sources).unwrap();

        fs::write(&source, "<module-config/>").unwrap();
        touch(&source, Duration::from_secs(5));
        assert!(matches!(cache.module("", &sources), Err(CacheError::Build(_))));

        let lenient = ModuleConfigCache::new(dir.path().join("cache2"), Arc::new(ConfigBuilder::new()))
            .serve_stale_on_error(true);
        fs::write(&source, DOC).unwrap();
        let good = lenient.module("", &sources).unwrap();
        fs::write(&source, "<module-config/>").unwrap();
        touch(&source, Duration::from_secs(10));
        let (served, outcome) = lenient.lookup("", &sources).unwrap();
        assert_eq!(outcome, Lookup::Stale);
        assert!(Arc::ptr_eq(&good, &served));
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let (dir, source, cache) = setup();
        let sources = vec![source];
        cache.module("", &sources).unwrap();

        cache.invalidate("").unwrap();
        assert!(!dir.path().join("cache/default.module.json").exists());
        let (_, outcome) = cache.lookup("", &sources).unwrap();
        assert_eq!(outcome, Lookup::Rebuilt);
    }

    #[test]
    fn test_changed_source_list_triggers_rebuild() {
        let (dir, source, cache) = setup();
        let extra = dir.path().join("extra.xml");
        fs::write(&extra, r#"<module-config><action-mappings><action path="/b" forward="/b.jsp"/></action-mappings></module-config>"#).unwrap();
        let old = SystemTime::now() - Duration::from_secs(60);
        fs::OpenOptions::new().write(true).open(&extra).unwrap().set_modified(old).unwrap();

        cache.module("", &[source.clone()]).unwrap();
        let both = vec![source.clone(), extra];
        let (config, outcome) = cache.lookup("", &both).unwrap();
        assert_eq!(outcome, Lookup::Rebuilt);
        assert!(config.find_action_config("/b").is_some());

        let restarted = ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new()));
        assert_eq!(restarted.lookup("", &both).unwrap().1, Lookup::Artifact);
        let (config, outcome) = restarted.lookup("", &[source]).unwrap();
        assert_eq!(outcome, Lookup::Rebuilt);
        assert!(config.find_action_config("/b").is_none());
    }

    #[test]
    fn test_stale_artifact_served_after_restart() {
        let (dir, source, cache) = setup();
        let sources = vec![source.clone()];
        let built = cache.module("", &sources).unwrap();

        fs::write(&source, "<module-config/>").unwrap();
        touch(&source, Duration::from_secs(5));

        let strict = ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new()));
        assert!(matches!(strict.module("", &sources), Err(CacheError::Build(_))));

        let lenient = ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new()))
            .serve_stale_on_error(true);
        let (served, outcome) = lenient.lookup("", &sources).unwrap();
        assert_eq!(outcome, Lookup::Stale);
        assert!(served.is_frozen());
        assert_eq!(*served, *built);
    }

    #[test]
    fn test_concurrent_lookups_share_one_build() {
        let (_dir, source, cache) = setup();
        let cache = Arc::new(cache);
        let sources = Arc::new(vec![source]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let sources = sources.clone();
                std::thread::spawn(move || cache.lookup("", &sources).unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let rebuilt = results.iter().filter(|(_, o)| *o == Lookup::Rebuilt).count();
        assert_eq!(rebuilt, 1);
        assert!(results.iter().all(|(c, _)| Arc::ptr_eq(c, &results[0].0)));
    }
}
