//! Module-switch handler.
//!
//! Reads the target module and page from the request, makes that module the
//! active one for the rest of the request, and forwards to the page in it.

use std::sync::Arc;
use crate::action::types::{ActionError, ActionForm, ActionForward, ActionResult};
use crate::action::ActionHandler;
use crate::config::DispatchConfig;
use crate::http::{Request, Response, MODULE_ATTRIBUTE};
use crate::model::{ActionConfig, ForwardConfig};
use crate::routing::ModuleCatalog;

pub struct SwitchAction {
    catalog: Arc<ModuleCatalog>,
    page_param: String,
    prefix_param: String,
}

impl SwitchAction {
    pub fn new(catalog: Arc<ModuleCatalog>, settings: &DispatchConfig) -> Self {
        Self {
            catalog,
            page_param: settings.page_param.clone(),
            prefix_param: settings.prefix_param.clone(),
        }
    }
}

impl std::fmt::Debug for SwitchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchAction")
            .field("page_param", &self.page_param)
            .field("prefix_param", &self.prefix_param)
            .finish_non_exhaustive()
    }
}

impl ActionHandler for SwitchAction {
    fn execute(
        &self,
        mapping: &ActionConfig,
        _form: Option<&ActionForm>,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> ActionResult {
        let (Some(page), Some(prefix)) = (
            request.parameter(&self.page_param).map(str::to_string),
            request.parameter(&self.prefix_param).map(str::to_string),
        ) else {
            return Err(ActionError::config(
                mapping,
                format!(
                    "module switch requires request parameters '{}' and '{}'",
                    self.page_param, self.prefix_param
                ),
            ));
        };

        if let Err(e) = self.catalog.module(&prefix) {
            tracing::warn!(path = %mapping.path(), prefix = %prefix, error = %e, "Module switch failed");
            response.set_status(400);
            response.write_body(&format!("Invalid module '{prefix}'"));
            return Ok(None);
        }

        request.set_attribute(MODULE_ATTRIBUTE, prefix.clone());
        tracing::debug!(path = %mapping.path(), prefix = %prefix, page = %page, "Switched module");

        let mut forward = ForwardConfig::to_path(page, false);
        forward.set_module(Some(prefix))?;
        Ok(Some(ActionForward::Path(forward)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::cache::ModuleConfigCache;
    use crate::http::{SimpleRequest, SimpleResponse};
    use std::fs;
    use tempfile::TempDir;

    fn handler(dir: &TempDir) -> SwitchAction {
        let source = dir.path().join("admin.xml");
        fs::write(
            &source,
            r#"<module-config><action-mappings><action path="/main" forward="/main.jsp"/></action-mappings></module-config>"#,
        )
        .unwrap();
        let cache = Arc::new(ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new())));
        let catalog = Arc::new(ModuleCatalog::new(cache, vec![("/admin".to_string(), vec![source])]));
        SwitchAction::new(catalog, &DispatchConfig::default())
    }

    #[test]
    fn test_switch_sets_module_and_forwards() {
        let dir = TempDir::new().unwrap();
        let mut request = SimpleRequest::new("/switch.do")
            .with_param("page", "/main.do")
            .with_param("prefix", "/admin");
        let result = handler(&dir)
            .execute(&ActionConfig::new("/switch"), None, &mut request, &mut SimpleResponse::new())
            .unwrap();

        assert_eq!(request.attribute(MODULE_ATTRIBUTE), Some("/admin"));
        match result {
            Some(ActionForward::Path(fc)) => {
                assert_eq!(fc.path(), "/main.do");
                assert_eq!(fc.module(), Some("/admin"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_missing_parameters_fail_before_switching() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        for mut request in [
            SimpleRequest::new("/switch.do").with_param("page", "/main.do"),
            SimpleRequest::new("/switch.do").with_param("prefix", "/admin"),
        ] {
            let result = handler.execute(&ActionConfig::new("/switch"), None, &mut request, &mut SimpleResponse::new());
            assert!(matches!(result, Err(ActionError::Config { .. })));
            assert_eq!(request.attribute(MODULE_ATTRIBUTE), None);
        }
    }

    #[test]
    fn test_unknown_module_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let mut request = SimpleRequest::new("/switch.do")
            .with_param("page", "/main.do")
            .with_param("prefix", "/nowhere");
        let mut response = SimpleResponse::new();
        let result = handler(&dir)
            .execute(&ActionConfig::new("/switch"), None, &mut request, &mut response)
            .unwrap();

        assert!(result.is_none());
        assert_eq!(response.status(), Some(400));
        assert_eq!(request.attribute(MODULE_ATTRIBUTE), None);
    }
}
