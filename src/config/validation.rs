//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Module prefixes unique and well-formed, every module has documents
//! - Handler parameter names non-empty, request mapping parseable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EngineConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use crate::config::schema::EngineConfig;
use crate::routing::matcher::parse_mapping;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("module prefix '{0}' must be empty or start with '/' and not end with '/'")]
    InvalidPrefix(String),

    #[error("module prefix '{0}' is declared more than once")]
    DuplicatePrefix(String),

    #[error("module '{0}' lists no source files")]
    NoSources(String),

    #[error("dispatch parameter '{0}' must not be empty")]
    EmptyParameter(&'static str),

    #[error("request mapping '{0}' must look like '*.ext' or '/path/*'")]
    InvalidMapping(String),

    #[error("metrics address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("cache directory must not be empty")]
    EmptyCacheDir,
}

pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for module in &config.modules {
        let prefix = module.prefix.as_str();
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            errors.push(ValidationError::InvalidPrefix(prefix.to_string()));
        }
        if !seen.insert(prefix) {
            errors.push(ValidationError::DuplicatePrefix(prefix.to_string()));
        }
        if module.files.is_empty() {
            errors.push(ValidationError::NoSources(prefix.to_string()));
        }
    }

    let dispatch = &config.dispatch;
    for (field, value) in [
        ("page_param", &dispatch.page_param),
        ("prefix_param", &dispatch.prefix_param),
        ("action_param", &dispatch.action_param),
        ("cancel_param", &dispatch.cancel_param),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::EmptyParameter(field));
        }
    }
    if parse_mapping(&dispatch.mapping).is_none() {
        errors.push(ValidationError::InvalidMapping(dispatch.mapping.clone()));
    }

    if config.cache.dir.trim().is_empty() {
        errors.push(ValidationError::EmptyCacheDir);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
