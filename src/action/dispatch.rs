//! Parameter-dispatch handler.
//!
//! # Data Flow
//! ```text
//! mapping.parameter  → name of the request parameter to read
//! request[that name] → operation name
//!     → "execute" / "perform"  → RecursiveDispatch
//!     → absent or empty        → unspecified hook (400)
//!     → registered operation   → run it
//!     → anything else          → method-not-found hook (500)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use crate::action::types::{ActionError, ActionForm, ActionResult, Operation, OperationNames};
use crate::action::ActionHandler;
use crate::http::{Request, Response};
use crate::model::ActionConfig;

/// Operation names that would re-enter the handler itself.
pub const RESERVED_OPERATIONS: &[&str] = &["execute", "perform"];

/// Called with the operation name that matched nothing.
pub type MissingHook = Arc<dyn Fn(&ActionConfig, &str, &mut dyn Response) -> ActionResult + Send + Sync>;

/// Wraps a closure as a [`MissingHook`].
pub fn missing_hook<F>(f: F) -> MissingHook
where
    F: Fn(&ActionConfig, &str, &mut dyn Response) -> ActionResult + Send + Sync + 'static,
{
    Arc::new(f)
}

pub struct DispatchAction {
    operations: BTreeMap<String, Operation>,
    unspecified: Option<Operation>,
    method_not_found: Option<MissingHook>,
}

impl DispatchAction {
    pub fn new() -> Self {
        Self {
            operations: BTreeMap::new(),
            unspecified: None,
            method_not_found: None,
        }
    }

    /// Register an operation under `name`.
    pub fn operation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.operations.insert(name.into(), operation);
        self
    }

    /// Run when the request carries no operation name.
    pub fn on_unspecified(mut self, hook: Operation) -> Self {
        self.unspecified = Some(hook);
        self
    }

    /// Run when the operation name is unknown.
    pub fn on_method_not_found(mut self, hook: MissingHook) -> Self {
        self.method_not_found = Some(hook);
        self
    }
}

impl Default for DispatchAction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchAction")
            .field("operations", &OperationNames(&self.operations))
            .finish_non_exhaustive()
    }
}

impl ActionHandler for DispatchAction {
    fn execute(
        &self,
        mapping: &ActionConfig,
        form: Option<&ActionForm>,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> ActionResult {
        let parameter = mapping
            .parameter()
            .ok_or_else(|| ActionError::config(mapping, "dispatch requires the mapping 'parameter' attribute"))?;

        let requested = request
            .parameter(parameter)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let Some(name) = requested else {
            tracing::debug!(path = %mapping.path(), parameter, "No operation named in request");
            return match &self.unspecified {
                Some(hook) => hook(mapping, form, request, response),
                None => {
                    response.set_status(400);
                    response.write_body(&format!(
                        "Request[{}] does not contain handler parameter named '{}'",
                        mapping.path(),
                        parameter
                    ));
                    Ok(None)
                }
            };
        };

        if RESERVED_OPERATIONS.contains(&name.as_str()) {
            tracing::warn!(path = %mapping.path(), operation = %name, "Recursive dispatch rejected");
            return Err(ActionError::RecursiveDispatch {
                path: mapping.path().to_string(),
                operation: name,
            });
        }

        match self.operations.get(&name) {
            Some(operation) => {
                tracing::debug!(path = %mapping.path(), operation = %name, "Dispatching");
                operation(mapping, form, request, response)
            }
            None => {
                tracing::warn!(path = %mapping.path(), operation = %name, "Unknown operation");
                match &self.method_not_found {
                    Some(hook) => hook(mapping, &name, response),
                    None => {
                        response.set_status(500);
                        response.write_body(&format!(
                            "Action[{}] does not contain method named '{}'",
                            mapping.path(),
                            name
                        ));
                        Ok(None)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::types::{operation, ActionForward};
    use crate::http::{SimpleRequest, SimpleResponse};

    fn mapping() -> ActionConfig {
        let mut mapping = ActionConfig::new("/orders");
        mapping.set_parameter(Some("method".into())).unwrap();
        mapping
    }

    fn handler() -> DispatchAction {
        DispatchAction::new()
            .operation("save", operation(|_, _, _, _| Ok(Some(ActionForward::named("saved")))))
            .operation("execute", operation(|_, _, _, _| Ok(Some(ActionForward::named("loop")))))
    }

    fn run(handler: &DispatchAction, mapping: &ActionConfig, method: Option<&str>) -> (ActionResult, SimpleResponse) {
        let mut request = SimpleRequest::new("/orders.do");
        if let Some(method) = method {
            request.set_parameter("method", method);
        }
        let mut response = SimpleResponse::new();
        let result = handler.execute(mapping, None, &mut request, &mut response);
        (result, response)
    }

    #[test]
    fn test_dispatches_by_parameter() {
        let (result, _) = run(&handler(), &mapping(), Some("save"));
        assert_eq!(result.unwrap(), Some(ActionForward::named("saved")));
    }

    #[test]
    fn test_entry_points_always_rejected() {
        for name in ["execute", "perform"] {
            let (result, _) = run(&handler(), &mapping(), Some(name));
            assert!(matches!(result, Err(ActionError::RecursiveDispatch { .. })), "{name}");
        }
    }

    #[test]
    fn test_unspecified_defaults_to_bad_request() {
        let (result, response) = run(&handler(), &mapping(), None);
        assert!(result.unwrap().is_none());
        assert_eq!(response.status(), Some(400));

        let (_, response) = run(&handler(), &mapping(), Some(""));
        assert_eq!(response.status(), Some(400));
    }

    #[test]
    fn test_unknown_defaults_to_internal_error() {
        let (result, response) = run(&handler(), &mapping(), Some("delete"));
        assert!(result.unwrap().is_none());
        assert_eq!(response.status(), Some(500));
    }

    #[test]
    fn test_hooks_override_defaults() {
        let handler = handler()
            .on_unspecified(operation(|_, _, _, _| Ok(Some(ActionForward::named("list")))))
            .on_method_not_found(missing_hook(|_, name, _| Ok(Some(ActionForward::named(format!("missing-{name}"))))));

        let (result, _) = run(&handler, &mapping(), None);
        assert_eq!(result.unwrap(), Some(ActionForward::named("list")));
        let (result, _) = run(&handler, &mapping(), Some("drop"));
        assert_eq!(result.unwrap(), Some(ActionForward::named("missing-drop")));
    }

    #[test]
    fn test_mapping_without_parameter_is_config_error() {
        let (result, _) = run(&handler(), &ActionConfig::new("/orders"), Some("save"));
        assert!(matches!(result, Err(ActionError::Config { .. })));
    }
}
