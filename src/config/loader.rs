//! Settings loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::config::schema::EngineConfig;
use crate::config::validation::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("settings validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate settings from a TOML file.
///
/// Relative module files and the cache directory resolve against the
/// settings file's directory.
pub fn load_config(path: &Path) -> Result<EngineConfig, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: EngineConfig = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(SettingsError::Validation)?;

    if let Some(base) = path.parent() {
        resolve_paths(&mut config, base);
    }
    tracing::debug!(path = %path.display(), modules = config.modules.len(), "Settings loaded");
    Ok(config)
}

fn resolve_paths(config: &mut EngineConfig, base: &Path) {
    let resolve = |p: &str| -> String {
        let candidate = Path::new(p);
        if candidate.is_absolute() {
            p.to_string()
        } else {
            base.join(candidate).display().to_string()
        }
    };

    config.cache.dir = resolve(&config.cache.dir);
    for module in &mut config.modules {
        for file in &mut module.files {
            *file = resolve(file);
        }
    }
}
