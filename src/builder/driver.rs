//! Stack-driven document walker.
//!
//! # Responsibilities
//! - Stream XML events and keep one frame per open element
//! - Apply the rule registered for each element path
//! - Attach completed objects to the object exposed on top of the stack
//!
//! # Design Decisions
//! - A creation failure is recorded, logged and leaves a `Failed` frame; its
//!   children are dropped and the build as a whole fails afterwards
//! - Structural problems (bad root, missing attributes) fail immediately

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use crate::builder::error::BuildError;
use crate::builder::rules::{rule_for, ConfigClassRegistry, ObjectKind, Rule, ROOT_ELEMENTS};
use crate::model::{
    ActionConfig, ControllerConfig, DataSourceConfig, ExceptionConfig, FormBeanConfig,
    FormPropertyConfig, ForwardConfig, MessageResourcesConfig, ModuleConfig, PlugInConfig,
};

/// A config class that could not be instantiated.
#[derive(Debug, Clone)]
pub(crate) struct Failure {
    pub(crate) class: String,
    pub(crate) element: String,
    pub(crate) document: String,
}

/// In-progress object held by a frame.
#[derive(Debug)]
enum ConfigObject {
    Action(ActionConfig),
    Forward(ForwardConfig),
    Exception(ExceptionConfig),
    FormBean(FormBeanConfig),
    FormProperty(FormPropertyConfig),
    DataSource(DataSourceConfig),
    PlugIn(PlugInConfig),
    Controller(ControllerConfig),
    MessageResources(MessageResourcesConfig),
}

#[derive(Debug)]
enum Slot {
    /// Children attach directly to the module.
    Module,
    Object(ConfigObject),
    /// Creation failed; children are discarded.
    Failed,
    /// No rule, or a rule with nothing to attach.
    Skipped,
}

#[derive(Debug)]
struct Frame {
    path: String,
    slot: Slot,
}

/// Attribute values of one element.
struct Attributes<'d> {
    document: &'d str,
    element: String,
    values: Vec<(String, String)>,
}

impl<'d> Attributes<'d> {
    fn parse(start: &BytesStart<'_>, document: &'d str, element: &str) -> Result<Self, BuildError> {
        let mut values = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| BuildError::malformed(document, e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| BuildError::malformed(document, e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| BuildError::malformed(document, e.to_string()))?
                .into_owned();
            values.push((key, value));
        }
        Ok(Self {
            document,
            element: element.to_string(),
            values,
        })
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    fn required(&self, name: &'static str) -> Result<&str, BuildError> {
        self.get(name).ok_or_else(|| BuildError::MissingAttribute {
            document: self.document.to_string(),
            element: self.element.clone(),
            attribute: name,
        })
    }

    fn invalid(&self, name: &str, value: &str) -> BuildError {
        BuildError::InvalidAttribute {
            document: self.document.to_string(),
            element: self.element.clone(),
            attribute: name.to_string(),
            value: value.to_string(),
        }
    }

    fn flag(&self, name: &str, default: bool) -> Result<bool, BuildError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(self.invalid(name, value)),
            },
        }
    }
}

/// Walks one document against an open module.
pub(crate) struct Walker<'a> {
    classes: &'a ConfigClassRegistry,
    failures: &'a mut Vec<Failure>,
    document: &'a str,
    stack: Vec<Frame>,
    root_seen: bool,
    default_class_set: bool,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        classes: &'a ConfigClassRegistry,
        failures: &'a mut Vec<Failure>,
        document: &'a str,
    ) -> Self {
        Self {
            classes,
            failures,
            document,
            stack: Vec::new(),
            root_seen: false,
            default_class_set: false,
        }
    }

    /// Apply `xml` to `module`.
    pub(crate) fn walk(mut self, module: &mut ModuleConfig, xml: &str) -> Result<(), BuildError> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => self.start(module, &start)?,
                Ok(Event::Empty(start)) => {
                    self.start(module, &start)?;
                    self.end(module)?;
                }
                Ok(Event::End(_)) => self.end(module)?,
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(BuildError::malformed(self.document, e.to_string())),
            }
        }

        if !self.root_seen {
            return Err(BuildError::malformed(self.document, "document has no root element"));
        }
        if !self.stack.is_empty() {
            return Err(BuildError::malformed(self.document, "unexpected end of document"));
        }
        Ok(())
    }

    fn start(&mut self, module: &mut ModuleConfig, start: &BytesStart<'_>) -> Result<(), BuildError> {
        let name = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|e| BuildError::malformed(self.document, e.to_string()))?
            .to_string();
        let attrs = Attributes::parse(start, self.document, &name)?;

        let path = match self.stack.last() {
            None => {
                if self.root_seen {
                    return Err(BuildError::malformed(self.document, "multiple root elements"));
                }
                if !ROOT_ELEMENTS.contains(&name.as_str()) {
                    return Err(BuildError::malformed(
                        self.document,
                        format!("unexpected root element <{name}>"),
                    ));
                }
                self.root_seen = true;
                self.stack.push(Frame {
                    path: String::new(),
                    slot: Slot::Module,
                });
                return Ok(());
            }
            Some(parent) if parent.path.is_empty() => name.clone(),
            Some(parent) => format!("{}/{}", parent.path, name),
        };

        let slot = match rule_for(&path) {
            None => {
                tracing::debug!(document = %self.document, element = %path, "No rule for element, skipping");
                Slot::Skipped
            }
            Some(Rule::Container) => Slot::Module,
            Some(Rule::SetDefaultClass) => {
                self.set_default_class(module, &attrs)?;
                Slot::Module
            }
            Some(Rule::SetProperty) => {
                self.set_property(&attrs)?;
                Slot::Skipped
            }
            Some(Rule::Create(kind)) => self.create(module, kind, &attrs)?,
        };

        self.stack.push(Frame { path, slot });
        Ok(())
    }

    fn end(&mut self, module: &mut ModuleConfig) -> Result<(), BuildError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| BuildError::malformed(self.document, "unbalanced end tag"))?;

        let Slot::Object(object) = frame.slot else {
            return Ok(());
        };

        match self.stack.last_mut().map(|parent| &mut parent.slot) {
            Some(Slot::Object(parent)) => attach_to_object(parent, object, self.document),
            Some(Slot::Failed) => {
                tracing::debug!(document = %self.document, element = %frame.path, "Parent failed to instantiate, dropping child");
                Ok(())
            }
            _ => attach_to_module(module, object, self.document),
        }
    }

    fn set_default_class(&mut self, module: &mut ModuleConfig, attrs: &Attributes<'_>) -> Result<(), BuildError> {
        let Some(class) = attrs.get("type") else {
            return Ok(());
        };
        if self.default_class_set {
            return Err(BuildError::malformed(
                self.document,
                "default action class may only be set once per document",
            ));
        }
        self.default_class_set = true;
        tracing::debug!(document = %self.document, class, "Default action class set");
        module.set_action_class(class)?;
        Ok(())
    }

    fn set_property(&mut self, attrs: &Attributes<'_>) -> Result<(), BuildError> {
        let property = attrs.required("property")?;
        let value = attrs.get("value").unwrap_or_default();

        match self.stack.last_mut().map(|frame| &mut frame.slot) {
            Some(Slot::Object(ConfigObject::DataSource(ds))) => ds.add_property(property, value)?,
            Some(Slot::Object(ConfigObject::PlugIn(plug_in))) => plug_in.add_property(property, value)?,
            Some(Slot::Failed) => {}
            _ => {
                tracing::warn!(document = %self.document, property, "set-property has no property bag to target");
            }
        }
        Ok(())
    }

    fn create(&mut self, module: &ModuleConfig, kind: ObjectKind, attrs: &Attributes<'_>) -> Result<Slot, BuildError> {
        let class = match kind.default_class() {
            // Plug-ins: className names the plug-in, not a config type.
            None => attrs.required("className")?.to_string(),
            Some(default_class) => {
                let class = attrs
                    .owned("className")
                    .or_else(|| match kind {
                        ObjectKind::Action => module.action_class().map(str::to_string),
                        _ => None,
                    })
                    .unwrap_or_else(|| default_class.to_string());

                if !self.classes.conforms(&class, kind) {
                    tracing::error!(
                        document = %self.document,
                        element = %attrs.element,
                        class = %class,
                        "Config class is unknown or does not conform to the element"
                    );
                    self.failures.push(Failure {
                        class,
                        element: attrs.element.clone(),
                        document: self.document.to_string(),
                    });
                    return Ok(Slot::Failed);
                }
                class
            }
        };

        let object = match kind {
            ObjectKind::Action => ConfigObject::Action(action(&class, attrs)?),
            ObjectKind::Forward => ConfigObject::Forward(forward(&class, attrs)?),
            ObjectKind::Exception => ConfigObject::Exception(exception(&class, attrs)?),
            ObjectKind::FormBean => ConfigObject::FormBean(form_bean(&class, attrs)?),
            ObjectKind::FormProperty => ConfigObject::FormProperty(form_property(&class, attrs)?),
            ObjectKind::DataSource => ConfigObject::DataSource(data_source(&class, attrs)?),
            ObjectKind::Controller => ConfigObject::Controller(controller(&class, attrs)?),
            ObjectKind::MessageResources => {
                ConfigObject::MessageResources(message_resources(&class, attrs)?)
            }
            ObjectKind::PlugIn => ConfigObject::PlugIn(PlugInConfig::new(class)),
        };
        Ok(Slot::Object(object))
    }
}

fn attach_to_object(parent: &mut ConfigObject, child: ConfigObject, document: &str) -> Result<(), BuildError> {
    match (parent, child) {
        (ConfigObject::Action(action), ConfigObject::Forward(forward)) => action.add_forward_config(forward)?,
        (ConfigObject::Action(action), ConfigObject::Exception(exception)) => {
            action.add_exception_config(exception)?
        }
        (ConfigObject::FormBean(bean), ConfigObject::FormProperty(property)) => {
            bean.add_form_property(property)?
        }
        (_, child) => {
            return Err(BuildError::malformed(
                document,
                format!("cannot attach {child:?} to its parent"),
            ))
        }
    }
    Ok(())
}

fn attach_to_module(module: &mut ModuleConfig, child: ConfigObject, document: &str) -> Result<(), BuildError> {
    match child {
        ConfigObject::Action(action) => module.add_action_config(action)?,
        ConfigObject::Forward(forward) => module.add_forward_config(forward)?,
        ConfigObject::Exception(exception) => module.add_exception_config(exception)?,
        ConfigObject::FormBean(bean) => module.add_form_bean_config(bean)?,
        ConfigObject::DataSource(ds) => module.add_data_source_config(ds)?,
        ConfigObject::PlugIn(plug_in) => module.add_plug_in_config(plug_in)?,
        ConfigObject::Controller(controller) => module.set_controller_config(controller)?,
        ConfigObject::MessageResources(resources) => module.add_message_resources_config(resources)?,
        ConfigObject::FormProperty(property) => {
            return Err(BuildError::malformed(
                document,
                format!("form-property '{}' outside a form-bean", property.name()),
            ))
        }
    }
    Ok(())
}

fn action(class: &str, attrs: &Attributes<'_>) -> Result<ActionConfig, BuildError> {
    let path = attrs.required("path")?;
    if !path.starts_with('/') {
        return Err(attrs.invalid("path", path));
    }
    let mut action = ActionConfig::new(path);
    action.set_class_name(class)?;
    action.set_handler_type(attrs.owned("type"))?;
    action.set_name(attrs.owned("name"))?;
    action.set_attribute(attrs.owned("attribute"))?;
    action.set_parameter(attrs.owned("parameter"))?;
    if let Some(scope) = attrs.get("scope") {
        if !matches!(scope, "request" | "session") {
            return Err(attrs.invalid("scope", scope));
        }
        action.set_scope(scope)?;
    }
    action.set_input(attrs.owned("input"))?;
    action.set_forward(attrs.owned("forward"))?;
    action.set_validate(attrs.flag("validate", true)?)?;
    Ok(action)
}

fn forward(class: &str, attrs: &Attributes<'_>) -> Result<ForwardConfig, BuildError> {
    let mut forward = ForwardConfig::new(attrs.required("name")?, attrs.required("path")?);
    forward.set_class_name(class)?;
    forward.set_redirect(attrs.flag("redirect", false)?)?;
    forward.set_context_relative(attrs.flag("contextRelative", false)?)?;
    forward.set_module(attrs.owned("module"))?;
    Ok(forward)
}

fn exception(class: &str, attrs: &Attributes<'_>) -> Result<ExceptionConfig, BuildError> {
    let mut exception = ExceptionConfig::default();
    exception.set_class_name(class)?;
    exception.set_exception_type(attrs.required("type")?)?;
    exception.set_key(attrs.owned("key"))?;
    exception.set_path(attrs.owned("path"))?;
    exception.set_handler(attrs.owned("handler"))?;
    if let Some(scope) = attrs.get("scope") {
        exception.set_scope(scope)?;
    }
    exception.set_bundle(attrs.owned("bundle"))?;
    Ok(exception)
}

fn form_bean(class: &str, attrs: &Attributes<'_>) -> Result<FormBeanConfig, BuildError> {
    let mut bean = FormBeanConfig::new(attrs.required("name")?);
    bean.set_class_name(class)?;
    bean.set_bean_type(attrs.owned("type"))?;
    Ok(bean)
}

fn form_property(class: &str, attrs: &Attributes<'_>) -> Result<FormPropertyConfig, BuildError> {
    let mut property = FormPropertyConfig::new(attrs.required("name")?);
    property.set_class_name(class)?;
    if let Some(property_type) = attrs.get("type") {
        property.set_property_type(property_type)?;
    }
    property.set_initial(attrs.owned("initial"))?;
    Ok(property)
}

fn data_source(class: &str, attrs: &Attributes<'_>) -> Result<DataSourceConfig, BuildError> {
    let mut ds = DataSourceConfig::default();
    ds.set_class_name(class)?;
    if let Some(key) = attrs.get("key") {
        ds.set_key(key)?;
    }
    ds.set_source_type(attrs.owned("type"))?;
    Ok(ds)
}

fn controller(class: &str, attrs: &Attributes<'_>) -> Result<ControllerConfig, BuildError> {
    let mut controller = ControllerConfig::default();
    controller.set_class_name(class)?;
    if let Some(processor) = attrs.get("processorClass") {
        controller.set_processor_class(processor)?;
    }
    if let Some(content_type) = attrs.get("contentType") {
        controller.set_content_type(content_type)?;
    }
    controller.set_nocache(attrs.flag("nocache", false)?)?;
    controller.set_input_forward(attrs.flag("inputForward", false)?)?;
    controller.set_locale(attrs.flag("locale", true)?)?;
    Ok(controller)
}

fn message_resources(class: &str, attrs: &Attributes<'_>) -> Result<MessageResourcesConfig, BuildError> {
    let mut resources = MessageResourcesConfig::new(attrs.required("parameter")?);
    resources.set_class_name(class)?;
    if let Some(key) = attrs.get("key") {
        resources.set_key(key)?;
    }
    resources.set_factory(attrs.owned("factory"))?;
    resources.set_null_value(attrs.flag("null", true)?)?;
    Ok(resources)
}
