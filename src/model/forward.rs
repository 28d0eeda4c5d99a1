//! Forward configuration: a named, symbolic destination.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};

/// A named destination a handler can return instead of writing a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardConfig {
    class_name: String,
    name: String,
    path: String,
    redirect: bool,
    context_relative: bool,
    /// Target module prefix when the forward crosses modules.
    module: Option<String>,
    frozen: bool,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            name: String::new(),
            path: String::new(),
            redirect: false,
            context_relative: false,
            module: None,
            frozen: false,
        }
    }
}

impl ForwardConfig {
    pub const DEFAULT_CLASS: &'static str = "ForwardConfig";
    const KIND: &'static str = "ForwardConfig";

    /// Create a named forward.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create an unnamed forward to a literal path.
    pub fn to_path(path: impl Into<String>, context_relative: bool) -> Self {
        Self {
            path: path.into(),
            context_relative,
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn redirect(&self) -> bool {
        self.redirect
    }

    pub fn context_relative(&self) -> bool {
        self.context_relative
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.class_name = class_name.into();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.path = path.into();
        Ok(())
    }

    pub fn set_redirect(&mut self, redirect: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.redirect = redirect;
        Ok(())
    }

    pub fn set_context_relative(&mut self, context_relative: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.context_relative = context_relative;
        Ok(())
    }

    pub fn set_module(&mut self, module: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.module = module;
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for ForwardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("name", &self.name)?;
        r.text("path", &self.path)?;
        r.flag("redirect", self.redirect)?;
        r.flag("contextRelative", self.context_relative)?;
        r.opt("module", self.module.as_deref())?;
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
    fn test_display_is_stable() {
        let mut fwd = ForwardConfig::new("success", "/welcome.jsp");
        fwd.set_redirect(true).unwrap();
        assert_eq!(
            fwd.to_string(),
            r#"ForwardConfig[name="success",path="/welcome.jsp",redirect=true,contextRelative=false]"#
        );
    }

    #[test]
    fn test_frozen_rejects_every_setter() {
        let mut fwd = ForwardConfig::new("success", "/welcome.jsp");
        fwd.freeze();
        let before = fwd.clone();

        assert!(fwd.set_name("other").is_err());
        assert!(fwd.set_path("/x").is_err());
        assert!(fwd.set_redirect(true).is_err());
        assert!(fwd.set_context_relative(true).is_err());
        assert!(fwd.set_module(Some("/admin".into())).is_err());
        assert!(fwd.set_class_name("Custom").is_err());
        assert_eq!(fwd, before);
    }
}
