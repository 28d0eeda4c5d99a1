//! Hot reload of changed modules.
//!
//! Consumes prefixes from the source watcher and runs a cache lookup for each,
//! so the rebuild happens here rather than on the next request.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use crate::routing::ModuleCatalog;

/// Rebuild modules as their prefixes arrive, until `shutdown` flips to true
/// or the watcher goes away. Returns the number of reloads attempted.
pub async fn run_reloader(
    catalog: Arc<ModuleCatalog>,
    mut changes: mpsc::UnboundedReceiver<String>,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    let mut reloads = 0;
    loop {
        tokio::select! {
            changed = changes.recv() => {
                let Some(prefix) = changed else {
                    tracing::debug!("Watcher channel closed");
                    break;
                };
                reloads += 1;
                let catalog = catalog.clone();
                let lookup_prefix = prefix.clone();
                let result = tokio::task::spawn_blocking(move || catalog.module(&lookup_prefix)).await;
                match result {
                    Ok(Ok(module)) => tracing::info!(
                        prefix = %prefix,
                        actions = module.action_configs().count(),
                        "Module reloaded"
                    ),
                    Ok(Err(e)) => tracing::error!(prefix = %prefix, error = %e, "Module reload failed"),
                    Err(e) => tracing::error!(prefix = %prefix, error = %e, "Reload task panicked"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("Reloader stopping");
                    break;
                }
            }
        }
    }
    reloads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::cache::{Lookup, ModuleConfigCache};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reloader_rebuilds_and_stops() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("main.xml");
        fs::write(&source, r#"<module-config><action-mappings><action path="/a" forward="/a.jsp"/></action-mappings></module-config>"#).unwrap();
        let cache = Arc::new(ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new())));
        let catalog = Arc::new(ModuleCatalog::new(cache.clone(), vec![(String::new(), vec![source.clone()])]));

        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_reloader(catalog, rx, stop_rx));

        tx.send(String::new()).unwrap();
        tx.send("/unknown".to_string()).unwrap();
        drop(tx);
        assert_eq!(task.await.unwrap(), 2);

        let (_, outcome) = cache.lookup("", &[source]).unwrap();
        assert_eq!(outcome, Lookup::Memo);
        drop(stop_tx);
    }

    #[tokio::test]
    async fn test_reloader_honours_shutdown() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(ModuleConfigCache::new(dir.path(), Arc::new(ConfigBuilder::new())));
        let catalog = Arc::new(ModuleCatalog::new(cache, Vec::new()));

        let (_tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_reloader(catalog, rx, stop_rx));
        stop_tx.send(true).unwrap();
        assert_eq!(task.await.unwrap(), 0);
    }
}
