//! Static-forward handler.

use crate::action::types::{ActionError, ActionForm, ActionForward, ActionResult};
use crate::action::ActionHandler;
use crate::http::{Request, Response};
use crate::model::{ActionConfig, ForwardConfig};

/// Forwards to the mapping's `parameter`: a local forward name when it looks
/// like an identifier, otherwise a literal context-relative path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardAction;

impl ForwardAction {
    pub fn new() -> Self {
        Self
    }
}

/// `[A-Za-z_][A-Za-z0-9_.-]*`
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl ActionHandler for ForwardAction {
    fn execute(
        &self,
        mapping: &ActionConfig,
        _form: Option<&ActionForm>,
        _request: &mut dyn Request,
        _response: &mut dyn Response,
    ) -> ActionResult {
        let parameter = mapping
            .parameter()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ActionError::config(mapping, "forward requires the mapping 'parameter' attribute"))?;

        if !is_identifier(parameter) {
            return Ok(Some(ActionForward::Path(ForwardConfig::to_path(parameter, true))));
        }

        match mapping.find_forward_config(parameter) {
            Some(forward) => Ok(Some(ActionForward::Path(forward.clone()))),
            None => Err(ActionError::config(
                mapping,
                format!("no forward named '{parameter}' is declared on this action"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{SimpleRequest, SimpleResponse};

    fn run(mapping: &ActionConfig) -> ActionResult {
        ForwardAction.execute(mapping, None, &mut SimpleRequest::new("/x.do"), &mut SimpleResponse::new())
    }

    fn mapping(parameter: Option<&str>) -> ActionConfig {
        let mut mapping = ActionConfig::new("/x");
        mapping.set_parameter(parameter.map(str::to_string)).unwrap();
        mapping
            .add_forward_config(ForwardConfig::new("target", "/target.jsp"))
            .unwrap();
        mapping
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_identifier("success"));
        assert!(is_identifier("_main.view-2"));
        assert!(!is_identifier("/index.jsp"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("a/b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_literal_path() {
        match run(&mapping(Some("/pages/about.jsp"))).unwrap() {
            Some(ActionForward::Path(fc)) => {
                assert_eq!(fc.path(), "/pages/about.jsp");
                assert!(fc.context_relative());
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_named_local_forward() {
        match run(&mapping(Some("target"))).unwrap() {
            Some(ActionForward::Path(fc)) => assert_eq!(fc.path(), "/target.jsp"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_unknown_name_or_missing_parameter() {
        assert!(matches!(run(&mapping(Some("nowhere"))), Err(ActionError::Config { .. })));
        assert!(matches!(run(&mapping(None)), Err(ActionError::Config { .. })));
    }
}
