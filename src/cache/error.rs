use std::path::PathBuf;
use thiserror::Error;
use crate::builder::BuildError;

#[derive(Debug, Error)]
pub enum CacheError {
    /// A module source file could not be stat'ed.
    #[error("module '{prefix}': source {path} is unreadable: {source}")]
    SourceUnreadable {
        prefix: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache directory or the existing artifact cannot be written.
    #[error("module '{prefix}': cache location {path} is not writable")]
    NotWritable { prefix: String, path: PathBuf },

    #[error("module '{prefix}': cache I/O on {path} failed: {source}")]
    Io {
        prefix: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Build(#[from] BuildError),
}
