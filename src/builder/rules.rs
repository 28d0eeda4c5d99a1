//! Declarative rule table: element path → builder action.
//!
//! # Design Decisions
//! - Paths are relative to the document root, joined with `/`
//! - Elements without a rule are skipped along with their subtree
//! - Config classes resolve through a registry instead of reflection; a class
//!   registered for a different element kind does not conform

use std::collections::HashMap;
use crate::model::{
    ActionConfig, ControllerConfig, DataSourceConfig, ExceptionConfig, FormBeanConfig,
    FormPropertyConfig, ForwardConfig, MessageResourcesConfig,
};

/// Root element names accepted for a module document.
pub const ROOT_ELEMENTS: &[&str] = &["module-config", "struts-config"];

/// Kind of config object a creation rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Action,
    Forward,
    Exception,
    FormBean,
    FormProperty,
    DataSource,
    PlugIn,
    Controller,
    MessageResources,
}

impl ObjectKind {
    /// Built-in config class for this kind.
    ///
    /// Plug-ins have none: their `className` names the plug-in itself.
    pub fn default_class(self) -> Option<&'static str> {
        match self {
            ObjectKind::Action => Some(ActionConfig::DEFAULT_CLASS),
            ObjectKind::Forward => Some(ForwardConfig::DEFAULT_CLASS),
            ObjectKind::Exception => Some(ExceptionConfig::DEFAULT_CLASS),
            ObjectKind::FormBean => Some(FormBeanConfig::DEFAULT_CLASS),
            ObjectKind::FormProperty => Some(FormPropertyConfig::DEFAULT_CLASS),
            ObjectKind::DataSource => Some(DataSourceConfig::DEFAULT_CLASS),
            ObjectKind::Controller => Some(ControllerConfig::DEFAULT_CLASS),
            ObjectKind::MessageResources => Some(MessageResourcesConfig::DEFAULT_CLASS),
            ObjectKind::PlugIn => None,
        }
    }
}

/// What the walker does for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Grouping element; children attach to the module.
    Container,
    /// Instantiate a config object on start, attach it to its parent on end.
    Create(ObjectKind),
    /// `property`/`value` pair added to the object on top of the stack.
    SetProperty,
    /// Container whose `type` attribute sets the module's default action class.
    SetDefaultClass,
}

const RULES: &[(&str, Rule)] = &[
    ("form-beans", Rule::Container),
    ("form-beans/form-bean", Rule::Create(ObjectKind::FormBean)),
    ("form-beans/form-bean/form-property", Rule::Create(ObjectKind::FormProperty)),
    ("global-exceptions", Rule::Container),
    ("global-exceptions/exception", Rule::Create(ObjectKind::Exception)),
    ("global-forwards", Rule::Container),
    ("global-forwards/forward", Rule::Create(ObjectKind::Forward)),
    ("action-mappings", Rule::SetDefaultClass),
    ("action-mappings/action", Rule::Create(ObjectKind::Action)),
    ("action-mappings/action/forward", Rule::Create(ObjectKind::Forward)),
    ("action-mappings/action/exception", Rule::Create(ObjectKind::Exception)),
    ("data-sources", Rule::Container),
    ("data-sources/data-source", Rule::Create(ObjectKind::DataSource)),
    ("data-sources/data-source/set-property", Rule::SetProperty),
    ("controller", Rule::Create(ObjectKind::Controller)),
    ("message-resources", Rule::Create(ObjectKind::MessageResources)),
    ("plug-in", Rule::Create(ObjectKind::PlugIn)),
    ("plug-in/set-property", Rule::SetProperty),
];

/// Rule registered for an element path, if any.
pub fn rule_for(path: &str) -> Option<Rule> {
    RULES
        .iter()
        .find(|(pattern, _)| *pattern == path)
        .map(|(_, rule)| *rule)
}

/// Known config classes and the element kind each one conforms to.
#[derive(Debug, Clone)]
pub struct ConfigClassRegistry {
    classes: HashMap<String, ObjectKind>,
}

impl Default for ConfigClassRegistry {
    fn default() -> Self {
        let mut registry = Self {
            classes: HashMap::new(),
        };
        for kind in [
            ObjectKind::Action,
            ObjectKind::Forward,
            ObjectKind::Exception,
            ObjectKind::FormBean,
            ObjectKind::FormProperty,
            ObjectKind::DataSource,
            ObjectKind::Controller,
            ObjectKind::MessageResources,
        ] {
            if let Some(class) = kind.default_class() {
                registry.register(class, kind);
            }
        }
        registry
    }
}

impl ConfigClassRegistry {
    /// Register an application-specific config class for `kind`.
    pub fn register(&mut self, class_name: impl Into<String>, kind: ObjectKind) {
        self.classes.insert(class_name.into(), kind);
    }

    pub fn kind_of(&self, class_name: &str) -> Option<ObjectKind> {
        self.classes.get(class_name).copied()
    }

    /// True when `class_name` is registered and conforms to `kind`.
    pub fn conforms(&self, class_name: &str, kind: ObjectKind) -> bool {
        self.kind_of(class_name) == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lookup() {
        assert_eq!(rule_for("action-mappings/action"), Some(Rule::Create(ObjectKind::Action)));
        assert_eq!(rule_for("plug-in/set-property"), Some(Rule::SetProperty));
        assert_eq!(rule_for("action-mappings"), Some(Rule::SetDefaultClass));
        assert_eq!(rule_for("action-mappings/action/set-property"), None);
        assert_eq!(rule_for("display-name"), None);
    }

    #[test]
    fn test_registry_conformance() {
        let mut registry = ConfigClassRegistry::default();
        assert!(registry.conforms("ActionConfig", ObjectKind::Action));
        assert!(!registry.conforms("ForwardConfig", ObjectKind::Action));
        assert!(!registry.conforms("SecureActionConfig", ObjectKind::Action));

        registry.register("SecureActionConfig", ObjectKind::Action);
        assert!(registry.conforms("SecureActionConfig", ObjectKind::Action));
    }
}
