//! On-disk snapshot of a frozen module.
//!
//! # Design Decisions
//! - JSON envelope carrying a format version, the prefix, the source list
//!   and the build time
//! - File names are an injective encoding of the prefix, so two modules never
//!   share an artifact
//! - Writes go to a temp file in the target directory, then rename, so
//!   readers never observe a partial artifact
//! - Any decode problem is a cache miss, never an error

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use serde::{Deserialize, Serialize};
use crate::cache::error::CacheError;
use crate::model::ModuleConfig;

/// Bumped whenever the serialized model changes shape.
pub const FORMAT_VERSION: u32 = 2;

pub const ARTIFACT_EXTENSION: &str = "module.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub format_version: u32,
    pub prefix: String,
    /// Source documents the config was built from, in build order.
    pub sources: Vec<PathBuf>,
    /// Captured before the build started.
    pub built_at: SystemTime,
    pub config: ModuleConfig,
}

/// Stable file-name stem for a module prefix.
///
/// `""` → `default`, `/admin/reports` → `module_admin_reports`. Every `/`
/// becomes `_`; bytes outside `[A-Za-z0-9.-]`, including `_` and `%`, are
/// written as `%XX`, so `/a_b` → `module_a%5Fb` stays apart from `/a/b`.
pub fn cache_identity(prefix: &str) -> String {
    if prefix.is_empty() {
        return "default".to_string();
    }
    let mut stem = String::from("module");
    for byte in prefix.bytes() {
        match byte {
            b'/' => stem.push('_'),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => stem.push(char::from(byte)),
            other => stem.push_str(&format!("%{other:02X}")),
        }
    }
    stem
}

pub fn artifact_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{}.{}", cache_identity(prefix), ARTIFACT_EXTENSION))
}

/// Read the artifact for `prefix`, or `None` if it is absent or unusable.
pub fn load(path: &Path, prefix: &str) -> Option<Envelope> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(prefix, path = %path.display(), error = %e, "No cache artifact");
            return None;
        }
    };

    let envelope: Envelope = match serde_json::from_reader(BufReader::new(file)) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(prefix, path = %path.display(), error = %e, "Cache artifact undecodable, treating as stale");
            return None;
        }
    };

    if envelope.format_version != FORMAT_VERSION {
        tracing::info!(
            prefix,
            found = envelope.format_version,
            expected = FORMAT_VERSION,
            "Cache artifact format changed, treating as stale"
        );
        return None;
    }
    if envelope.prefix != prefix || envelope.config.prefix() != prefix {
        tracing::warn!(prefix, found = %envelope.prefix, "Cache artifact belongs to another module");
        return None;
    }
    Some(envelope)
}

/// Atomically replace the artifact at `path`.
pub fn store(path: &Path, envelope: &Envelope) -> Result<(), CacheError> {
    let io_err = |source: std::io::Error| CacheError::Io {
        prefix: envelope.prefix.clone(),
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, envelope).map_err(|e| io_err(e.into()))?;
        writer.flush().map_err(io_err)?;
    }
    temp_file.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(prefix = %envelope.prefix, path = %path.display(), "Cache artifact written");
    Ok(())
}

/// Fail unless the cache directory (created on demand) and any existing
/// artifact are writable.
pub fn ensure_writable(dir: &Path, artifact: &Path, prefix: &str) -> Result<(), CacheError> {
    let not_writable = |path: &Path| CacheError::NotWritable {
        prefix: prefix.to_string(),
        path: path.to_path_buf(),
    };

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            tracing::error!(prefix, dir = %dir.display(), error = %e, "Cannot create cache directory");
            not_writable(dir)
        })?;
    }

    let dir_meta = fs::metadata(dir).map_err(|_| not_writable(dir))?;
    if !dir_meta.is_dir() || dir_meta.permissions().readonly() {
        return Err(not_writable(dir));
    }

    match fs::metadata(artifact) {
        Ok(meta) if meta.permissions().readonly() => Err(not_writable(artifact)),
        _ => Ok(()),
    }
}

/// Remove the artifact, ignoring a missing file.
pub fn remove(path: &Path, prefix: &str) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CacheError::Io {
            prefix: prefix.to_string(),
            path: path.to_path_buf(),
            source,
        }),
    }
}
