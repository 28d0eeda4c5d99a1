//! Convention-dispatch handler.
//!
//! `action=save` runs the operation registered as `doSave` (method prefix
//! plus the capitalized value). A cancel marker parameter runs the cancel
//! hook first; a forward from that hook ends the request.

use std::collections::BTreeMap;
use std::fmt;
use crate::action::types::{ActionForm, ActionForward, ActionResult, Operation, OperationNames};
use crate::action::ActionHandler;
use crate::config::DispatchConfig;
use crate::http::{Request, Response};
use crate::model::ActionConfig;

pub struct CompactAction {
    action_param: String,
    method_prefix: String,
    cancel_param: String,
    operations: BTreeMap<String, Operation>,
    index: Option<Operation>,
    cancelled: Option<Operation>,
}

impl CompactAction {
    pub fn new(settings: &DispatchConfig) -> Self {
        Self {
            action_param: settings.action_param.clone(),
            method_prefix: settings.method_prefix.clone(),
            cancel_param: settings.cancel_param.clone(),
            operations: BTreeMap::new(),
            index: None,
            cancelled: None,
        }
    }

    /// Register an operation under its full name, e.g. `doSave`.
    pub fn operation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.operations.insert(name.into(), operation);
        self
    }

    /// Run when no operation is requested. Defaults to the `index` forward.
    pub fn on_index(mut self, hook: Operation) -> Self {
        self.index = Some(hook);
        self
    }

    /// Run before dispatch when the cancel marker is present.
    pub fn on_cancelled(mut self, hook: Operation) -> Self {
        self.cancelled = Some(hook);
        self
    }

    /// Operation name for a requested action value.
    pub fn operation_name(&self, action: &str) -> String {
        let mut chars = action.chars();
        match chars.next() {
            Some(first) => format!("{}{}{}", self.method_prefix, first.to_uppercase(), chars.as_str()),
            None => self.method_prefix.clone(),
        }
    }
}

impl Default for CompactAction {
    fn default() -> Self {
        Self::new(&DispatchConfig::default())
    }
}

impl fmt::Debug for CompactAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactAction")
            .field("action_param", &self.action_param)
            .field("method_prefix", &self.method_prefix)
            .field("operations", &OperationNames(&self.operations))
            .finish_non_exhaustive()
    }
}

impl ActionHandler for CompactAction {
    fn execute(
        &self,
        mapping: &ActionConfig,
        form: Option<&ActionForm>,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> ActionResult {
        if request.parameter(&self.cancel_param).is_some() {
            tracing::debug!(path = %mapping.path(), "Submission cancelled");
            if let Some(hook) = &self.cancelled {
                if let Some(forward) = hook(mapping, form, request, response)? {
                    return Ok(Some(forward));
                }
            }
        }

        let requested = request
            .parameter(&self.action_param)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let Some(action) = requested else {
            return match &self.index {
                Some(hook) => hook(mapping, form, request, response),
                None => Ok(Some(ActionForward::named("index"))),
            };
        };

        let name = self.operation_name(&action);
        match self.operations.get(&name) {
            Some(operation) => {
                tracing::debug!(path = %mapping.path(), operation = %name, "Dispatching");
                operation(mapping, form, request, response)
            }
            None => {
                tracing::warn!(path = %mapping.path(), action = %action, operation = %name, "Unknown operation");
                response.set_status(400);
                response.write_body(&format!("Unknown action '{action}'"));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::types::operation;
    use crate::http::{SimpleRequest, SimpleResponse};

    fn handler() -> CompactAction {
        CompactAction::default()
            .operation("doSave", operation(|_, _, _, _| Ok(Some(ActionForward::named("saved")))))
    }

    fn run(handler: &CompactAction, request: &mut SimpleRequest) -> (ActionResult, SimpleResponse) {
        let mut response = SimpleResponse::new();
        let result = handler.execute(&ActionConfig::new("/edit"), None, request, &mut response);
        (result, response)
    }

    #[test]
    fn test_operation_name() {
        let handler = handler();
        assert_eq!(handler.operation_name("save"), "doSave");
        assert_eq!(handler.operation_name("list"), "doList");
    }

    #[test]
    fn test_routes_by_convention() {
        let (result, _) = run(&handler(), &mut SimpleRequest::new("/edit.do").with_param("action", "save"));
        assert_eq!(result.unwrap(), Some(ActionForward::named("saved")));
    }

    #[test]
    fn test_empty_or_absent_action_goes_to_index() {
        let (result, _) = run(&handler(), &mut SimpleRequest::new("/edit.do"));
        assert_eq!(result.unwrap(), Some(ActionForward::named("index")));

        let (result, _) = run(&handler(), &mut SimpleRequest::new("/edit.do").with_param("action", ""));
        assert_eq!(result.unwrap(), Some(ActionForward::named("index")));
    }

    #[test]
    fn test_unknown_action_is_bad_request() {
        let (result, response) = run(&handler(), &mut SimpleRequest::new("/edit.do").with_param("action", "drop"));
        assert!(result.unwrap().is_none());
        assert_eq!(response.status(), Some(400));
    }

    #[test]
    fn test_cancel_hook_short_circuits() {
        let handler = handler().on_cancelled(operation(|_, _, _, _| Ok(Some(ActionForward::named("cancelled")))));
        let mut request = SimpleRequest::new("/edit.do")
            .with_param("action", "save")
            .with_param("cancel", "Cancel");
        let (result, _) = run(&handler, &mut request);
        assert_eq!(result.unwrap(), Some(ActionForward::named("cancelled")));
    }

    #[test]
    fn test_cancel_hook_without_forward_continues() {
        let handler = handler().on_cancelled(operation(|_, _, _, _| Ok(None)));
        let mut request = SimpleRequest::new("/edit.do")
            .with_param("action", "save")
            .with_param("cancel", "Cancel");
        let (result, _) = run(&handler, &mut request);
        assert_eq!(result.unwrap(), Some(ActionForward::named("saved")));
    }
}
