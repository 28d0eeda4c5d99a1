//! Exception mapping: error type → destination path.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionConfig {
    class_name: String,
    /// Error type identifier this mapping handles.
    exception_type: String,
    /// Message key describing the failure.
    key: Option<String>,
    path: Option<String>,
    handler: Option<String>,
    scope: String,
    bundle: Option<String>,
    frozen: bool,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            exception_type: String::new(),
            key: None,
            path: None,
            handler: None,
            scope: "request".to_string(),
            bundle: None,
            frozen: false,
        }
    }
}

impl ExceptionConfig {
    pub const DEFAULT_CLASS: &'static str = "ExceptionConfig";
    const KIND: &'static str = "ExceptionConfig";

    pub fn new(exception_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            exception_type: exception_type.into(),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn exception_type(&self) -> &str {
        &self.exception_type
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.class_name = class_name.into();
        Ok(())
    }

    pub fn set_exception_type(&mut self, exception_type: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.exception_type = exception_type.into();
        Ok(())
    }

    pub fn set_key(&mut self, key: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.key = key;
        Ok(())
    }

    pub fn set_path(&mut self, path: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.path = path;
        Ok(())
    }

    pub fn set_handler(&mut self, handler: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.handler = handler;
        Ok(())
    }

    pub fn set_scope(&mut self, scope: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.scope = scope.into();
        Ok(())
    }

    pub fn set_bundle(&mut self, bundle: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.exception_type)?;
        self.bundle = bundle;
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for ExceptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("type", &self.exception_type)?;
        r.opt("key", self.key.as_deref())?;
        r.opt("path", self.path.as_deref())?;
        r.opt("handler", self.handler.as_deref())?;
        r.text("scope", &self.scope)?;
        r.opt("bundle", self.bundle.as_deref())?;
        if self.class_name != Self::DEFAULT_CLASS {
            r.text("className", &self.class_name)?;
        }
        r.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let exc = ExceptionConfig::new("DatabaseError", "/error.jsp");
        assert_eq!(
            exc.to_string(),
            r#"ExceptionConfig[type="DatabaseError",path="/error.jsp",scope="request"]"#
        );
    }

    #[test]
    fn test_frozen() {
        let mut exc = ExceptionConfig::new("DatabaseError", "/error.jsp");
        exc.freeze();
        assert!(exc.set_path(None).is_err());
        assert!(exc.set_scope("session").is_err());
        assert_eq!(exc.path(), Some("/error.jsp"));
        assert_eq!(exc.scope(), "request");
    }
}
