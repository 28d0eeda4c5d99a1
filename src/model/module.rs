//! Module configuration: the root aggregate for one routing namespace.
//!
//! # Responsibilities
//! - Own every config object declared for one module prefix
//! - Resolve actions, global forwards and exception mappings by key
//! - Freeze the whole graph in one call
//!
//! # Design Decisions
//! - Sorted maps keep serialization and rendering deterministic
//! - Actions refer back to the module by prefix only; ownership flows one way

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use serde::{Deserialize, Serialize};
use crate::model::action::ActionConfig;
use crate::model::controller::ControllerConfig;
use crate::model::data_source::DataSourceConfig;
use crate::model::exception::ExceptionConfig;
use crate::model::form_bean::FormBeanConfig;
use crate::model::forward::ForwardConfig;
use crate::model::freeze::{ensure_mutable, FrozenError, Render};
use crate::model::message_resources::MessageResourcesConfig;
use crate::model::plug_in::PlugInConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    prefix: String,
    /// Config class used for `<action>` elements that omit `className`.
    action_class: Option<String>,
    actions: BTreeMap<String, ActionConfig>,
    forwards: BTreeMap<String, ForwardConfig>,
    exceptions: Vec<ExceptionConfig>,
    form_beans: BTreeMap<String, FormBeanConfig>,
    data_sources: BTreeMap<String, DataSourceConfig>,
    message_resources: BTreeMap<String, MessageResourcesConfig>,
    plug_ins: Vec<PlugInConfig>,
    controller: ControllerConfig,
    frozen: bool,
}

impl ModuleConfig {
    const KIND: &'static str = "ModuleConfig";

    /// Create an empty, mutable module. `""` is the default module.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            action_class: None,
            actions: BTreeMap::new(),
            forwards: BTreeMap::new(),
            exceptions: Vec::new(),
            form_beans: BTreeMap::new(),
            data_sources: BTreeMap::new(),
            message_resources: BTreeMap::new(),
            plug_ins: Vec::new(),
            controller: ControllerConfig::default(),
            frozen: false,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn action_class(&self) -> Option<&str> {
        self.action_class.as_deref()
    }

    pub fn controller_config(&self) -> &ControllerConfig {
        &self.controller
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// True when the module declares nothing routable or configurable.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
            && self.forwards.is_empty()
            && self.form_beans.is_empty()
            && self.data_sources.is_empty()
            && self.plug_ins.is_empty()
    }

    pub fn set_action_class(&mut self, action_class: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.action_class = Some(action_class.into());
        Ok(())
    }

    pub fn set_controller_config(&mut self, controller: ControllerConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.controller = controller;
        Ok(())
    }

    // Actions

    /// Attach an action. An existing action with the same path is replaced.
    pub fn add_action_config(&mut self, mut action: ActionConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        action.set_module_prefix(&self.prefix)?;
        if let Some(previous) = self.actions.insert(action.path().to_string(), action) {
            tracing::warn!(prefix = %self.prefix, path = %previous.path(), "Duplicate action path replaced");
        }
        Ok(())
    }

    pub fn remove_action_config(&mut self, path: &str) -> Result<Option<ActionConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        Ok(self.actions.remove(path))
    }

    pub fn find_action_config(&self, path: &str) -> Option<&ActionConfig> {
        self.actions.get(path)
    }

    pub fn action_configs(&self) -> impl Iterator<Item = &ActionConfig> {
        self.actions.values()
    }

    // Global forwards

    pub fn add_forward_config(&mut self, forward: ForwardConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.forwards.insert(forward.name().to_string(), forward);
        Ok(())
    }

    pub fn remove_forward_config(&mut self, name: &str) -> Result<Option<ForwardConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        Ok(self.forwards.remove(name))
    }

    /// Global forward by name.
    pub fn find_forward_config(&self, name: &str) -> Option<&ForwardConfig> {
        self.forwards.get(name)
    }

    pub fn forward_configs(&self) -> impl Iterator<Item = &ForwardConfig> {
        self.forwards.values()
    }

    // Global exceptions

    pub fn add_exception_config(&mut self, exception: ExceptionConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.exceptions.push(exception);
        Ok(())
    }

    /// Remove the first global mapping for `exception_type`, in declaration order.
    pub fn remove_exception_config(&mut self, exception_type: &str) -> Result<Option<ExceptionConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        let index = self
            .exceptions
            .iter()
            .position(|e| e.exception_type() == exception_type);
        Ok(index.map(|i| self.exceptions.remove(i)))
    }

    /// Global exception mapping for `exception_type`.
    pub fn find_exception_config(&self, exception_type: &str) -> Option<&ExceptionConfig> {
        self.exceptions
            .iter()
            .find(|e| e.exception_type() == exception_type)
    }

    pub fn exception_configs(&self) -> &[ExceptionConfig] {
        &self.exceptions
    }

    /// Exception mapping for an error raised while serving `action_path`:
    /// the action's own mappings first, then the module's global ones.
    pub fn find_exception(&self, action_path: &str, exception_type: &str) -> Option<&ExceptionConfig> {
        self.find_action_config(action_path)
            .and_then(|action| action.find_exception_config(exception_type))
            .or_else(|| self.find_exception_config(exception_type))
    }

    // Form beans

    pub fn add_form_bean_config(&mut self, bean: FormBeanConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.form_beans.insert(bean.name().to_string(), bean);
        Ok(())
    }

    pub fn remove_form_bean_config(&mut self, name: &str) -> Result<Option<FormBeanConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        Ok(self.form_beans.remove(name))
    }

    pub fn find_form_bean_config(&self, name: &str) -> Option<&FormBeanConfig> {
        self.form_beans.get(name)
    }

    pub fn form_bean_configs(&self) -> impl Iterator<Item = &FormBeanConfig> {
        self.form_beans.values()
    }

    // Data sources

    pub fn add_data_source_config(&mut self, data_source: DataSourceConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.data_sources.insert(data_source.key().to_string(), data_source);
        Ok(())
    }

    pub fn remove_data_source_config(&mut self, key: &str) -> Result<Option<DataSourceConfig>, FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        Ok(self.data_sources.remove(key))
    }

    pub fn find_data_source_config(&self, key: &str) -> Option<&DataSourceConfig> {
        self.data_sources.get(key)
    }

    pub fn data_source_configs(&self) -> impl Iterator<Item = &DataSourceConfig> {
        self.data_sources.values()
    }

    // Message resources

    pub fn add_message_resources_config(&mut self, resources: MessageResourcesConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.message_resources.insert(resources.key().to_string(), resources);
        Ok(())
    }

    pub fn find_message_resources_config(&self, key: &str) -> Option<&MessageResourcesConfig> {
        self.message_resources.get(key)
    }

    pub fn message_resources_configs(&self) -> impl Iterator<Item = &MessageResourcesConfig> {
        self.message_resources.values()
    }

    // Plug-ins

    pub fn add_plug_in_config(&mut self, plug_in: PlugInConfig) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.prefix)?;
        self.plug_ins.push(plug_in);
        Ok(())
    }

    pub fn plug_in_configs(&self) -> &[PlugInConfig] {
        &self.plug_ins
    }

    /// Freeze the module and every object it owns. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.controller.freeze();
        for action in self.actions.values_mut() {
            action.freeze();
        }
        for forward in self.forwards.values_mut() {
            forward.freeze();
        }
        for exception in &mut self.exceptions {
            exception.freeze();
        }
        for bean in self.form_beans.values_mut() {
            bean.freeze();
        }
        for data_source in self.data_sources.values_mut() {
            data_source.freeze();
        }
        for resources in self.message_resources.values_mut() {
            resources.freeze();
        }
        for plug_in in &mut self.plug_ins {
            plug_in.freeze();
        }
    }

    /// Multi-line rendering of the module and everything it owns.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{self}");
        let _ = writeln!(out, "  {}", self.controller);
        for bean in self.form_beans.values() {
            let _ = writeln!(out, "  {bean}");
            for property in bean.form_properties() {
                let _ = writeln!(out, "    {property}");
            }
        }
        for forward in self.forwards.values() {
            let _ = writeln!(out, "  {forward}");
        }
        for exception in &self.exceptions {
            let _ = writeln!(out, "  {exception}");
        }
        for action in self.actions.values() {
            let _ = writeln!(out, "  {action}");
            for forward in action.forward_configs() {
                let _ = writeln!(out, "    {forward}");
            }
            for exception in action.exception_configs() {
                let _ = writeln!(out, "    {exception}");
            }
        }
        for data_source in self.data_sources.values() {
            let _ = writeln!(out, "  {data_source}");
        }
        for resources in self.message_resources.values() {
            let _ = writeln!(out, "  {resources}");
        }
        for plug_in in &self.plug_ins {
            let _ = writeln!(out, "  {plug_in}");
        }
        out
    }
}

impl fmt::Display for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("prefix", &self.prefix)?;
        r.opt("actionClass", self.action_class.as_deref())?;
        r.count("actions", self.actions.len())?;
        r.count("forwards", self.forwards.len())?;
        r.count("exceptions", self.exceptions.len())?;
        r.count("formBeans", self.form_beans.len())?;
        r.count("dataSources", self.data_sources.len())?;
        r.count("messageResources", self.message_resources.len())?;
        r.count("plugIns", self.plug_ins.len())?;
        r.flag("frozen", self.frozen)?;
        r.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModuleConfig {
        let mut module = ModuleConfig::new("/admin");
        let mut login = ActionConfig::new("/login");
        login.add_forward_config(ForwardConfig::new("success", "/local.jsp")).unwrap();
        module.add_action_config(login).unwrap();
        module.add_forward_config(ForwardConfig::new("success", "/global.jsp")).unwrap();
        module.add_forward_config(ForwardConfig::new("logoff", "/logoff.jsp")).unwrap();
        module.add_exception_config(ExceptionConfig::new("DbError", "/db.jsp")).unwrap();
        module.add_form_bean_config(FormBeanConfig::new("loginForm")).unwrap();
        module.add_data_source_config(DataSourceConfig::default()).unwrap();
        module.add_plug_in_config(PlugInConfig::new("Tiles")).unwrap();
        module
    }

    #[test]
    fn test_action_gets_module_back_reference() {
        let module = sample();
        assert_eq!(module.find_action_config("/login").unwrap().module_prefix(), "/admin");
    }

    #[test]
    fn test_freeze_propagates_everywhere() {
        let mut module = sample();
        module.freeze();

        assert!(module.is_frozen());
        assert!(module.controller_config().is_frozen());
        assert!(module.action_configs().all(|a| a.is_frozen()));
        assert!(module.find_action_config("/login").unwrap().forward_configs().all(|f| f.is_frozen()));
        assert!(module.forward_configs().all(|f| f.is_frozen()));
        assert!(module.exception_configs().iter().all(|e| e.is_frozen()));
        assert!(module.form_bean_configs().all(|b| b.is_frozen()));
        assert!(module.data_source_configs().all(|d| d.is_frozen()));
        assert!(module.plug_in_configs().iter().all(|p| p.is_frozen()));
    }

    #[test]
    fn test_frozen_module_rejects_mutation() {
        let mut module = sample();
        module.freeze();
        let before = module.clone();

        assert!(module.add_action_config(ActionConfig::new("/new")).is_err());
        assert!(module.remove_action_config("/login").is_err());
        assert!(module.add_forward_config(ForwardConfig::new("x", "/x")).is_err());
        assert!(module.remove_exception_config("DbError").is_err());
        assert!(module.add_plug_in_config(PlugInConfig::new("Other")).is_err());
        assert!(module.set_action_class("Custom").is_err());
        assert!(module.set_controller_config(ControllerConfig::default()).is_err());
        assert_eq!(module, before);
    }

    #[test]
    fn test_find_exception_prefers_action_mapping() {
        let mut module = sample();
        let mut action = ActionConfig::new("/save");
        action.add_exception_config(ExceptionConfig::new("DbError", "/save-db.jsp")).unwrap();
        module.add_action_config(action).unwrap();

        assert_eq!(module.find_exception("/save", "DbError").unwrap().path(), Some("/save-db.jsp"));
        assert_eq!(module.find_exception("/login", "DbError").unwrap().path(), Some("/db.jsp"));
        assert!(module.find_exception("/login", "Other").is_none());
    }

    #[test]
    fn test_remove_global_exception_takes_first_match_only() {
        let mut module = sample();
        module.add_exception_config(ExceptionConfig::new("DbError", "/db-fallback.jsp")).unwrap();

        let removed = module.remove_exception_config("DbError").unwrap().unwrap();
        assert_eq!(removed.path(), Some("/db.jsp"));
        assert_eq!(module.find_exception_config("DbError").unwrap().path(), Some("/db-fallback.jsp"));
    }

    #[test]
    fn test_is_empty() {
        assert!(ModuleConfig::new("").is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn test_display() {
        let mut module = sample();
        module.freeze();
        assert_eq!(
            module.to_string(),
            r#"ModuleConfig[prefix="/admin",actions=1,forwards=2,exceptions=1,formBeans=1,dataSources=1,messageResources=0,plugIns=1,frozen=true]"#
        );
        assert!(module.render().contains(r#"ActionConfig[path="/login""#));
    }
}
