use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};
use crate::model::properties::Properties;

/// Plug-in declaration: an implementation name plus ordered properties.
///
/// `plugin_class` names the host application's plug-in, not a config type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlugInConfig {
    plugin_class: String,
    properties: Properties,
    frozen: bool,
}

impl PlugInConfig {
    const KIND: &'static str = "PlugInConfig";

    pub fn new(plugin_class: impl Into<String>) -> Self {
        Self {
            plugin_class: plugin_class.into(),
            ..Self::default()
        }
    }

    pub fn plugin_class(&self) -> &str {
        &self.plugin_class
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_plugin_class(&mut self, plugin_class: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.plugin_class)?;
        self.plugin_class = plugin_class.into();
        Ok(())
    }

    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.plugin_class)?;
        self.properties.insert(name.into(), value.into());
        Ok(())
    }

    pub fn remove_property(&mut self, name: &str) -> Result<Option<String>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.plugin_class)?;
        Ok(self.properties.remove(name))
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for PlugInConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("className", &self.plugin_class)?;
        for (name, value) in self.properties.iter() {
            r.text(name, value)?;
        }
        r.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_freeze() {
        let mut plugin = PlugInConfig::new("ValidatorPlugIn");
        plugin.add_property("pathnames", "/validation.xml").unwrap();
        plugin.freeze();

        assert!(plugin.add_property("stopOnFirstError", "true").is_err());
        assert!(plugin.set_plugin_class("Other").is_err());
        assert_eq!(
            plugin.to_string(),
            r#"PlugInConfig[className="ValidatorPlugIn",pathnames="/validation.xml"]"#
        );
    }
}
