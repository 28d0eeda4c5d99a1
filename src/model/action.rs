//! Action configuration: one routable path within a module.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::exception::ExceptionConfig;
use crate::model::forward::ForwardConfig;
use crate::model::freeze::{ensure_mutable, FrozenError, Render};

/// Configuration record for one action path.
///
/// Owns its local forwards and exception mappings. The owning module is
/// referenced by prefix only; the module is the owner, never the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    class_name: String,
    path: String,
    /// Handler type identifier, resolved through the handler registry.
    handler_type: Option<String>,
    /// Form bean name.
    name: Option<String>,
    attribute: Option<String>,
    parameter: Option<String>,
    scope: String,
    input: Option<String>,
    /// Direct forward path; such actions never reach a handler.
    forward: Option<String>,
    validate: bool,
    module_prefix: String,
    forwards: BTreeMap<String, ForwardConfig>,
    exceptions: Vec<ExceptionConfig>,
    frozen: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            path: String::new(),
            handler_type: None,
            name: None,
            attribute: None,
            parameter: None,
            scope: "session".to_string(),
            input: None,
            forward: None,
            validate: true,
            module_prefix: String::new(),
            forwards: BTreeMap::new(),
            exceptions: Vec::new(),
            frozen: false,
        }
    }
}

impl ActionConfig {
    pub const DEFAULT_CLASS: &'static str = "ActionConfig";
    const KIND: &'static str = "ActionConfig";

    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler_type(&self) -> Option<&str> {
        self.handler_type.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attribute under which the form bean is stored; defaults to the bean name.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref().or(self.name.as_deref())
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn forward(&self) -> Option<&str> {
        self.forward.as_deref()
    }

    pub fn validate(&self) -> bool {
        self.validate
    }

    /// Prefix of the owning module.
    pub fn module_prefix(&self) -> &str {
        &self.module_prefix
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.class_name = class_name.into();
        Ok(())
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.path = path.into();
        Ok(())
    }

    pub fn set_handler_type(&mut self, handler_type: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.handler_type = handler_type;
        Ok(())
    }

    pub fn set_name(&mut self, name: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.name = name;
        Ok(())
    }

    pub fn set_attribute(&mut self, attribute: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.attribute = attribute;
        Ok(())
    }

    pub fn set_parameter(&mut self, parameter: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.parameter = parameter;
        Ok(())
    }

    pub fn set_scope(&mut self, scope: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.scope = scope.into();
        Ok(())
    }

    pub fn set_input(&mut self, input: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.input = input;
        Ok(())
    }

    pub fn set_forward(&mut self, forward: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.forward = forward;
        Ok(())
    }

    pub fn set_validate(&mut self, validate: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.validate = validate;
        Ok(())
    }

    /// Only the owning module sets this, while attaching the action.
    pub(crate) fn set_module_prefix(&mut self, prefix: &str) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.module_prefix = prefix.to_string();
        Ok(())
    }

    /// Add a local forward. A forward with the same name is replaced.
    pub fn add_forward_config(&mut self, forward: ForwardConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.forwards.insert(forward.name().to_string(), forward);
        Ok(())
    }

    pub fn remove_forward_config(&mut self, name: &str) -> Result<Option<ForwardConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        Ok(self.forwards.remove(name))
    }

    /// Local forward by name. Global forwards are the module's concern.
    pub fn find_forward_config(&self, name: &str) -> Option<&ForwardConfig> {
        self.forwards.get(name)
    }

    pub fn forward_configs(&self) -> impl Iterator<Item = &ForwardConfig> {
        self.forwards.values()
    }

    pub fn add_exception_config(&mut self, exception: ExceptionConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        self.exceptions.push(exception);
        Ok(())
    }

    /// Remove the first local mapping for `exception_type`, in declaration
    /// order. Later mappings for the same type stay.
    pub fn remove_exception_config(&mut self, exception_type: &str) -> Result<Option<ExceptionConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.path)?;
        let index = self
            .exceptions
            .iter()
            .position(|e| e.exception_type() == exception_type);
        Ok(index.map(|i| self.exceptions.remove(i)))
    }

    /// First local mapping for `exception_type`, in declaration order.
    pub fn find_exception_config(&self, exception_type: &str) -> Option<&ExceptionConfig> {
        self.exceptions
            .iter()
            .find(|e| e.exception_type() == exception_type)
    }

    pub fn exception_configs(&self) -> &[ExceptionConfig] {
        &self.exceptions
    }

    /// Freeze this action and everything it owns.
    pub fn freeze(&mut self) {
        self.frozen = true;
        for forward in self.forwards.values_mut() {
            forward.freeze();
        }
        for exception in &mut self.exceptions {
            exception.freeze();
        }
    }
}

impl fmt::Display for ActionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("path", &self.path)?;
        r.opt("type", self.handler_type.as_deref())?;
        r.opt("name", self.name.as_deref())?;
        r.opt("attribute", self.attribute.as_deref())?;
        r.opt("parameter", self.parameter.as_deref())?;
        r.text("scope", &self.scope)?;
        r.opt("input", self.input.as_deref())?;
        r.opt("forward", self.forward.as_deref())?;
        r.flag("validate", self.validate)?;
        if self.class_name != Self::DEFAULT_CLASS {
            r.text("className", &self.class_name)?;
        }
        r.finish()
    }
}
