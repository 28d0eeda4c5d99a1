//! Request path mapping.
//!
//! # Responsibilities
//! - Pick the module whose prefix owns a request path
//! - Strip the servlet-style mapping to recover the action path
//!
//! # Design Decisions
//! - Prefix matching respects segment boundaries (`/admin` never owns `/administrator`)
//! - Longest configured prefix wins; the default module (`""`) owns the rest
//! - No regex: extension and path-prefix mappings are plain string checks

use std::fmt::Debug;

/// Strips the request mapping from a module-relative path.
pub trait PathMapping: Send + Sync + Debug {
    /// Action path for `path`, or `None` if the mapping does not apply.
    fn action_path(&self, path: &str) -> Option<String>;
}

/// `*.do`: the action path is the request path minus the extension.
#[derive(Debug, Clone)]
pub struct ExtensionMapping {
    extension: String,
}

impl ExtensionMapping {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl PathMapping for ExtensionMapping {
    fn action_path(&self, path: &str) -> Option<String> {
        let stem = path.strip_suffix(&self.extension)?.strip_suffix('.')?;
        let last_segment = stem.rsplit('/').next().unwrap_or(stem);
        if last_segment.is_empty() {
            return None;
        }
        Some(stem.to_string())
    }
}

/// `/do/*`: the action path is whatever follows the mapping prefix.
#[derive(Debug, Clone)]
pub struct PrefixMapping {
    prefix: String,
}

impl PrefixMapping {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathMapping for PrefixMapping {
    fn action_path(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(&self.prefix)?;
        if rest.len() > 1 && rest.starts_with('/') {
            Some(rest.to_string())
        } else {
            None
        }
    }
}

/// Parse `*.ext` or `/path/*`.
pub fn parse_mapping(pattern: &str) -> Option<Box<dyn PathMapping>> {
    if let Some(extension) = pattern.strip_prefix("*.") {
        if !extension.is_empty() && !extension.contains(['/', '*', '.']) {
            return Some(Box::new(ExtensionMapping::new(extension)));
        }
        return None;
    }
    if let Some(prefix) = pattern.strip_suffix("/*") {
        if prefix.starts_with('/') && prefix.len() > 1 && !prefix.contains('*') {
            return Some(Box::new(PrefixMapping::new(prefix)));
        }
    }
    None
}

/// Longest prefix in `prefixes` owning `path` on a segment boundary.
pub fn select_module<'a>(path: &str, prefixes: impl IntoIterator<Item = &'a str>) -> &'a str {
    prefixes
        .into_iter()
        .filter(|prefix| {
            prefix.is_empty()
                || path
                    .strip_prefix(*prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .max_by_key(|prefix| prefix.len())
        .unwrap_or("")
}
