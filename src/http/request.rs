//! Request seen by the dispatch engine.
//!
//! # Responsibilities
//! - Expose the request path and query/form parameters
//! - Carry per-request attributes (e.g. the active module after a switch)
//!
//! # Design Decisions
//! - The transport is an external collaborator; the engine only needs
//!   get/set accessors, so the seam is a trait
//! - `SimpleRequest` is the in-memory implementation used by the CLI and tests

use std::collections::HashMap;

/// Request attribute naming the module selected by a module switch.
pub const MODULE_ATTRIBUTE: &str = "action_router.module";

pub trait Request {
    /// Context-relative request path, e.g. `/admin/login.do`.
    fn path(&self) -> &str;

    /// First value of the named parameter.
    fn parameter(&self, name: &str) -> Option<&str>;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, name: &str, value: String);
}

#[derive(Debug, Clone, Default)]
pub struct SimpleRequest {
    path: String,
    parameters: HashMap<String, String>,
    attributes: HashMap<String, String>,
}

impl SimpleRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Builder-style parameter setter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }
}

impl Request for SimpleRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_request_accessors() {
        let mut req = SimpleRequest::new("/login.do").with_param("user", "ann");
        assert_eq!(req.path(), "/login.do");
        assert_eq!(req.parameter("user"), Some("ann"));
        assert_eq!(req.parameter("missing"), None);

        req.set_attribute(MODULE_ATTRIBUTE, "/admin".into());
        assert_eq!(req.attribute(MODULE_ATTRIBUTE), Some("/admin"));
    }
}
