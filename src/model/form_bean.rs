//! Form bean declarations.

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};

/// One declared property of a form bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPropertyConfig {
    class_name: String,
    name: String,
    property_type: String,
    initial: Option<String>,
    frozen: bool,
}

impl Default for FormPropertyConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            name: String::new(),
            property_type: "string".to_string(),
            initial: None,
            frozen: false,
        }
    }
}

impl FormPropertyConfig {
    pub const DEFAULT_CLASS: &'static str = "FormPropertyConfig";
    const KIND: &'static str = "FormPropertyConfig";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &str {
        &self.property_type
    }

    pub fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
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

    pub fn set_property_type(&mut self, property_type: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.property_type = property_type.into();
        Ok(())
    }

    pub fn set_initial(&mut self, initial: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.initial = initial;
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for FormPropertyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("name", &self.name)?;
        r.text("type", &self.property_type)?;
        r.opt("initial", self.initial.as_deref())?;
        r.finish()
    }
}

/// A named form bean: the set of request properties an action consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormBeanConfig {
    class_name: String,
    name: String,
    bean_type: Option<String>,
    properties: Vec<FormPropertyConfig>,
    frozen: bool,
}

impl Default for FormBeanConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            name: String::new(),
            bean_type: None,
            properties: Vec::new(),
            frozen: false,
        }
    }
}

impl FormBeanConfig {
    pub const DEFAULT_CLASS: &'static str = "FormBeanConfig";
    const KIND: &'static str = "FormBeanConfig";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bean_type(&self) -> Option<&str> {
        self.bean_type.as_deref()
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

    pub fn set_bean_type(&mut self, bean_type: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        self.bean_type = bean_type;
        Ok(())
    }

    /// Declare a property. A property with the same name is replaced in place.
    pub fn add_form_property(&mut self, property: FormPropertyConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        match self.properties.iter_mut().find(|p| p.name() == property.name()) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        Ok(())
    }

    pub fn remove_form_property(&mut self, name: &str) -> Result<Option<FormPropertyConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.name)?;
        let index = self.properties.iter().position(|p| p.name() == name);
        Ok(index.map(|i| self.properties.remove(i)))
    }

    pub fn find_form_property(&self, name: &str) -> Option<&FormPropertyConfig> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn form_properties(&self) -> &[FormPropertyConfig] {
        &self.properties
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
        for property in &mut self.properties {
            property.freeze();
        }
    }
}

impl fmt::Display for FormBeanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("name", &self.name)?;
        r.opt("type", self.bean_type.as_deref())?;
        r.count("properties", self.properties.len())?;
        if self.class_name != Self::DEFAULT_CLASS {
            r.text("className", &self.class_name)?;
        }
        r.finish()
    }
}
