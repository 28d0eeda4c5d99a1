use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};

/// Key used when a `<message-resources>` omits one.
pub const DEFAULT_MESSAGES_KEY: &str = "messages";

/// Message bundle declaration. Loading the bundle is the view layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResourcesConfig {
    class_name: String,
    key: String,
    /// Bundle name handed to the factory.
    parameter: String,
    factory: Option<String>,
    /// Return `None` rather than a placeholder for missing messages.
    null_value: bool,
    frozen: bool,
}

impl Default for MessageResourcesConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            key: DEFAULT_MESSAGES_KEY.to_string(),
            parameter: String::new(),
            factory: None,
            null_value: true,
            frozen: false,
        }
    }
}

impl MessageResourcesConfig {
    pub const DEFAULT_CLASS: &'static str = "MessageResourcesConfig";
    const KIND: &'static str = "MessageResourcesConfig";

    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn factory(&self) -> Option<&str> {
        self.factory.as_deref()
    }

    pub fn null_value(&self) -> bool {
        self.null_value
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.class_name = class_name.into();
        Ok(())
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.key = key.into();
        Ok(())
    }

    pub fn set_parameter(&mut self, parameter: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.parameter = parameter.into();
        Ok(())
    }

    pub fn set_factory(&mut self, factory: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.factory = factory;
        Ok(())
    }

    pub fn set_null_value(&mut self, null_value: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.null_value = null_value;
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for MessageResourcesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("key", &self.key)?;
        r.text("parameter", &self.parameter)?;
        r.opt("factory", self.factory.as_deref())?;
        r.flag("null", self.null_value)?;
        r.finish()
    }
}
