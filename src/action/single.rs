//! Single-operation handler.

use std::fmt;
use crate::action::types::{ActionForm, ActionResult, Operation};
use crate::action::ActionHandler;
use crate::http::{Request, Response};
use crate::model::ActionConfig;

/// Always runs the same operation.
#[derive(Clone)]
pub struct FnAction {
    operation: Operation,
}

impl FnAction {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").finish_non_exhaustive()
    }
}

impl ActionHandler for FnAction {
    fn execute(
        &self,
        mapping: &ActionConfig,
        form: Option<&ActionForm>,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> ActionResult {
        (self.operation)(mapping, form, request, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::types::{operation, ActionForward};
    use crate::http::{SimpleRequest, SimpleResponse};

    #[test]
    fn test_runs_its_operation() {
        let handler = FnAction::new(operation(|_, _, _, _| Ok(Some(ActionForward::named("success")))));
        let mapping = ActionConfig::new("/a");
        let result = handler
            .execute(&mapping, None, &mut SimpleRequest::new("/a.do"), &mut SimpleResponse::new())
            .unwrap();
        assert_eq!(result, Some(ActionForward::named("success")));
    }
}
