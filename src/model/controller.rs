use std::fmt;
use serde::{Deserialize, Serialize};
use crate::model::freeze::{ensure_mutable, FrozenError, Render};

/// Module-wide request processing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    class_name: String,
    processor_class: String,
    content_type: String,
    nocache: bool,
    input_forward: bool,
    locale: bool,
    frozen: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            class_name: Self::DEFAULT_CLASS.to_string(),
            processor_class: Self::DEFAULT_PROCESSOR.to_string(),
            content_type: "text/html".to_string(),
            nocache: false,
            input_forward: false,
            locale: true,
            frozen: false,
        }
    }
}

impl ControllerConfig {
    pub const DEFAULT_CLASS: &'static str = "ControllerConfig";
    pub const DEFAULT_PROCESSOR: &'static str = "RequestProcessor";
    const KIND: &'static str = "ControllerConfig";

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn processor_class(&self) -> &str {
        &self.processor_class
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn nocache(&self) -> bool {
        self.nocache
    }

    pub fn input_forward(&self) -> bool {
        self.input_forward
    }

    pub fn locale(&self) -> bool {
        self.locale
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.processor_class)?;
        self.class_name = class_name.into();
        Ok(())
    }

    pub fn set_processor_class(&mut self, processor_class: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.processor_class)?;
        self.processor_class = processor_class.into();
        Ok(())
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.processor_class)?;
        self.content_type = content_type.into();
        Ok(())
    }

    pub fn set_nocache(&mut self, nocache: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.processor_class)?;
        self.nocache = nocache;
        Ok(())
    }

    pub fn set_input_forward(&mut self, input_forward: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.processor_class)?;
        self.input_forward = input_forward;
        Ok(())
    }

    pub fn set_locale(&mut self, locale: bool) -> Result<(), FrozenError> {
        ensure_mutable(self.frozen, Self::KIND, &self.processor_class)?;
        self.locale = locale;
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl fmt::Display for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r = Render::new(f, Self::KIND)?;
        r.text("processorClass", &self.processor_class)?;
        r.text("contentType", &self.content_type)?;
        r.flag("nocache", self.nocache)?;
        r.flag("inputForward", self.input_forward)?;
        r.flag("locale", self.locale)?;
        r.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render() {
        assert_eq!(
            ControllerConfig::default().to_string(),
            r#"ControllerConfig[processorClass="RequestProcessor",contentType="text/html",nocache=false,inputForward=false,locale=true]"#
        );
    }

    #[test]
    fn test_frozen_rejects_every_setter() {
        let mut controller = ControllerConfig::default();
        controller.set_nocache(true).unwrap();
        controller.freeze();
        let before = controller.clone();

        assert!(controller.set_class_name("Custom").is_err());
        assert!(controller.set_processor_class("OtherProcessor").is_err());
        assert!(controller.set_content_type("text/plain").is_err());
        assert!(controller.set_nocache(false).is_err());
        assert!(controller.set_input_forward(true).is_err());
        assert!(controller.set_locale(false).is_err());
        assert_eq!(controller, before);
    }
}
