//! Types shared by every handler.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use crate::http::{Request, Response};
use crate::model::{ActionConfig, FormBeanConfig, ForwardConfig, FrozenError};

/// What a handler asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionForward {
    /// Resolve by name: action-local forwards first, then global ones.
    Named(String),
    /// Go to this destination as-is.
    Path(ForwardConfig),
}

impl ActionForward {
    pub fn named(name: impl Into<String>) -> Self {
        ActionForward::Named(name.into())
    }

    /// Context-relative forward to a literal path.
    pub fn path(path: impl Into<String>) -> Self {
        ActionForward::Path(ForwardConfig::to_path(path, true))
    }
}

/// Form data bound to one request.
///
/// Starts from the form bean's declared properties and their initial values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionForm {
    name: String,
    values: BTreeMap<String, String>,
}

impl ActionForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn from_config(bean: &FormBeanConfig) -> Self {
        let mut form = Self::new(bean.name());
        for property in bean.form_properties() {
            form.values.insert(
                property.name().to_string(),
                property.initial().unwrap_or_default().to_string(),
            );
        }
        form
    }

    /// Copy request parameters matching declared properties.
    pub fn populate(&mut self, request: &dyn Request) {
        for (name, value) in self.values.iter_mut() {
            if let Some(param) = request.parameter(name) {
                *value = param.to_string();
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.values.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.values.insert(property.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    /// The mapping or request lacks something the handler requires.
    #[error("action {path}: {message}")]
    Config { path: String, message: String },

    /// The requested operation is an entry point of the handler itself.
    #[error("action {path}: operation '{operation}' would dispatch recursively")]
    RecursiveDispatch { path: String, operation: String },

    #[error(transparent)]
    Frozen(#[from] FrozenError),

    /// Raised by application code inside an operation.
    #[error("{0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    pub fn config(mapping: &ActionConfig, message: impl Into<String>) -> Self {
        ActionError::Config {
            path: mapping.path().to_string(),
            message: message.into(),
        }
    }

    /// Wrap an application error.
    pub fn handler(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        ActionError::Handler(Box::new(error))
    }
}

pub type ActionResult = Result<Option<ActionForward>, ActionError>;

/// A named operation. `None` means the response is complete.
pub type Operation =
    Arc<dyn Fn(&ActionConfig, Option<&ActionForm>, &mut dyn Request, &mut dyn Response) -> ActionResult + Send + Sync>;

/// Wraps a closure as an [`Operation`].
pub fn operation<F>(f: F) -> Operation
where
    F: Fn(&ActionConfig, Option<&ActionForm>, &mut dyn Request, &mut dyn Response) -> ActionResult
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

pub(crate) struct OperationNames<'a>(pub(crate) &'a BTreeMap<String, Operation>);

impl fmt::Debug for OperationNames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.keys()).finish()
    }
}
