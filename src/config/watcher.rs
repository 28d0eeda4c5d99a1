//! Module source watcher for hot reload.
//!
//! Watches the directories holding module documents and reports the prefix
//! of every module whose documents changed. Directories are watched instead
//! of files so editors that save by rename are still seen.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A watcher over every module's source documents.
pub struct ConfigWatcher {
    /// Source file → prefixes that include it.
    files: HashMap<PathBuf, Vec<String>>,
    update_tx: mpsc::UnboundedSender<String>,
}

impl ConfigWatcher {
    /// Create a watcher for `(prefix, files)` pairs.
    ///
    /// Returns the watcher and a receiver of changed module prefixes.
    pub fn new(modules: impl IntoIterator<Item = (String, Vec<PathBuf>)>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let mut files: HashMap<PathBuf, Vec<String>> = HashMap::new();
        for (prefix, sources) in modules {
            for source in sources {
                files.entry(normalize(&source)).or_default().push(prefix.clone());
            }
        }
        (Self { files, update_tx }, update_rx)
    }

    /// Prefixes affected by a change to `path`.
    pub fn prefixes_for(&self, path: &Path) -> &[String] {
        self.files
            .get(&normalize(path))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Start watching in a background thread. Keep the returned watcher alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directories: BTreeSet<PathBuf> = self
            .files
            .keys()
            .filter_map(|file| file.parent().map(Path::to_path_buf))
            .collect();

        let tx = self.update_tx.clone();
        let files = self.files.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let mut changed = BTreeSet::new();
                    for path in &event.paths {
                        if let Some(prefixes) = files.get(&normalize(path)) {
                            changed.extend(prefixes.iter().cloned());
                        }
                    }
                    for prefix in changed {
                        tracing::info!(prefix = %prefix, "Module source change detected");
                        let _ = tx.send(prefix);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for directory in &directories {
            watcher.watch(directory, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(directories = directories.len(), files = self.files.len(), "Module source watcher started");
        Ok(watcher)
    }
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prefixes_for_shared_file() {
        let dir = TempDir::new().unwrap();
        let shared = dir.path().join("shared.xml");
        let admin = dir.path().join("admin.xml");
        std::fs::write(&shared, "<module-config/>").unwrap();
        std::fs::write(&admin, "<module-config/>").unwrap();

        let (watcher, _rx) = ConfigWatcher::new(vec![
            (String::new(), vec![shared.clone()]),
            ("/admin".to_string(), vec![shared.clone(), admin.clone()]),
        ]);

        assert_eq!(watcher.prefixes_for(&shared), ["".to_string(), "/admin".to_string()]);
        assert_eq!(watcher.prefixes_for(&admin), ["/admin".to_string()]);
        assert!(watcher.prefixes_for(&dir.path().join("other.xml")).is_empty());
    }
}
