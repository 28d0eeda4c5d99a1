use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};
use crate::model::properties::Properties;

/// Key used when a `<data-source>` omits one.
pub const DEFAULT_DATA_SOURCE_KEY: &str = "dataSource";

/// Data source declaration. Initialization is left to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    class_name: String,
    key: String,
    source_type: Option<String>,
    properties: Properties,
    frozen: bool,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            key: DEFAULT_DATA_SOURCE_KEY.to_string(),
            source_type: None,
            properties: Properties::default(),
            frozen: false,
        }
    }
}

impl DataSourceConfig {
    pub const DEFAULT_CLASS: &'static str = "DataSourceConfig";
    const KIND: &'static str = "DataSourceConfig";

    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source_type(&self) -> Option<&str> {
        self.source_type.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
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

    pub fn set_source_type(&mut self, source_type: Option<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.source_type = source_type;
        Ok(())
    }

    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        self.properties.insert(name.into(), value.into());
        Ok(())
    }

    pub fn remove_property(&mut self, name: &str) -> Result<Option<String>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.key)?;
        Ok(self.properties.remove(name))
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for DataSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("key", &self.key)?;
        r.opt("type", self.source_type.as_deref())?;
        for (name, value) in self.properties.iter() {
            r.text(name, value)?;
        }
        r.finish()
    }
}
