//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve module and action path for a request
//! - Obtain the handler instance for the action, constructing it once
//! - Bind the form bean, invoke the handler, resolve the returned forward
//!
//! # Design Decisions
//! - Handler instances live for the process, one per (module, handler type)
//! - Construction holds the map entry, so two requests never build the same
//!   handler twice
//! - Forwards are resolved one level only; the caller follows them
//! - Explicit errors for every miss rather than silent defaults

use std::fmt;
use std::sync::Arc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use crate::action::{ActionForm, ActionForward, ActionHandler, HandlerContext, HandlerRegistry};
use crate::config::{DispatchConfig, ValidationError};
use crate::http::{Request, Response};
use crate::model::{ActionConfig, ForwardConfig, ModuleConfig};
use crate::observability::metrics;
use crate::routing::catalog::ModuleCatalog;
use crate::routing::error::{DispatchError, RoutingError};
use crate::routing::matcher::{parse_mapping, PathMapping};

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler wrote the response itself.
    Completed,
    /// Continue at this destination.
    Forward(ForwardConfig),
}

pub struct DispatchRouter {
    catalog: Arc<ModuleCatalog>,
    registry: HandlerRegistry,
    context: HandlerContext,
    mapping: Box<dyn PathMapping>,
    handlers: DashMap<(String, String), Arc<dyn ActionHandler>>,
}

impl DispatchRouter {
    pub fn new(
        catalog: Arc<ModuleCatalog>,
        registry: HandlerRegistry,
        settings: DispatchConfig,
    ) -> Result<Self, ValidationError> {
        let mapping = parse_mapping(&settings.mapping)
            .ok_or_else(|| ValidationError::InvalidMapping(settings.mapping.clone()))?;
        let context = HandlerContext {
            catalog: catalog.clone(),
            settings,
        };
        Ok(Self {
            catalog,
            registry,
            context,
            mapping,
            handlers: DashMap::new(),
        })
    }

    pub fn catalog(&self) -> &Arc<ModuleCatalog> {
        &self.catalog
    }

    /// Route a request to the module owning its path.
    pub fn dispatch(&self, request: &mut dyn Request, response: &mut dyn Response) -> Result<DispatchOutcome, DispatchError> {
        let prefix = self.catalog.select_module(request.path());
        self.dispatch_in(&prefix, request, response)
    }

    /// Route a request within an already selected module.
    pub fn dispatch_in(
        &self,
        prefix: &str,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> Result<DispatchOutcome, DispatchError> {
        let result = self.dispatch_inner(prefix, request, response);
        let outcome = match &result {
            Ok(DispatchOutcome::Completed) => "completed",
            Ok(DispatchOutcome::Forward(_)) => "forward",
            Err(DispatchError::Routing(_)) => "routing_error",
            Err(DispatchError::Action(_)) => "handler_error",
        };
        metrics::record_dispatch(prefix, outcome);
        if let Err(e) = &result {
            tracing::warn!(prefix, path = %request.path(), error = %e, status = ?e.status(), "Dispatch failed");
        }
        result
    }

    fn dispatch_inner(
        &self,
        prefix: &str,
        request: &mut dyn Request,
        response: &mut dyn Response,
    ) -> Result<DispatchOutcome, DispatchError> {
        let module = self.catalog.module(prefix)?;
        let action_path = self.action_path(prefix, request.path())?;
        let action = find_action(&module, &action_path)?;

        if let Some(path) = action.forward() {
            tracing::debug!(prefix, path = %action_path, forward = %path, "Direct forward");
            return Ok(DispatchOutcome::Forward(ForwardConfig::to_path(path, false)));
        }

        let handler_type = action.handler_type().ok_or_else(|| RoutingError::NoHandler {
            prefix: prefix.to_string(),
            path: action_path.clone(),
        })?;

        let form = self.bind_form(&module, action, request)?;
        let handler = self.handler_for(prefix, handler_type)?;

        tracing::debug!(prefix, path = %action_path, handler = handler_type, "Invoking handler");
        match handler.execute(action, form.as_ref(), request, response)? {
            None => Ok(DispatchOutcome::Completed),
            Some(ActionForward::Path(forward)) => Ok(DispatchOutcome::Forward(forward)),
            Some(ActionForward::Named(name)) => {
                Ok(DispatchOutcome::Forward(resolve_forward(&module, action, &name)?.clone()))
            }
        }
    }

    /// Action path for `request_path` inside module `prefix`.
    pub fn action_path(&self, prefix: &str, request_path: &str) -> Result<String, RoutingError> {
        let unmapped = || RoutingError::Unmapped {
            path: request_path.to_string(),
        };
        let within = request_path.strip_prefix(prefix).ok_or_else(unmapped)?;
        self.mapping.action_path(within).ok_or_else(unmapped)
    }

    /// Shared handler instance for `(prefix, handler_type)`.
    pub fn handler_for(&self, prefix: &str, handler_type: &str) -> Result<Arc<dyn ActionHandler>, RoutingError> {
        let key = (prefix.to_string(), handler_type.to_string());
        if let Some(handler) = self.handlers.get(&key) {
            return Ok(handler.clone());
        }

        match self.handlers.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let handler = self.registry.create(handler_type, &self.context).map_err(|message| {
                    tracing::error!(prefix, handler = handler_type, error = %message, "Handler construction failed");
                    RoutingError::HandlerConstruction {
                        prefix: prefix.to_string(),
                        handler_type: handler_type.to_string(),
                        message,
                    }
                })?;
                tracing::info!(prefix, handler = handler_type, "Handler instance created");
                metrics::record_handler_instance(prefix);
                entry.insert(handler.clone());
                Ok(handler)
            }
        }
    }

    fn bind_form(
        &self,
        module: &ModuleConfig,
        action: &ActionConfig,
        request: &dyn Request,
    ) -> Result<Option<ActionForm>, RoutingError> {
        let Some(name) = action.name() else {
            return Ok(None);
        };
        let bean = module
            .find_form_bean_config(name)
            .ok_or_else(|| RoutingError::FormBeanNotFound {
                prefix: module.prefix().to_string(),
                path: action.path().to_string(),
                name: name.to_string(),
            })?;
        let mut form = ActionForm::from_config(bean);
        form.populate(request);
        Ok(Some(form))
    }
}

impl fmt::Debug for DispatchRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRouter")
            .field("mapping", &self.mapping)
            .field("registry", &self.registry)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

/// The action mapped to `path` in `module`.
pub fn find_action<'m>(module: &'m ModuleConfig, path: &str) -> Result<&'m ActionConfig, RoutingError> {
    module
        .find_action_config(path)
        .ok_or_else(|| RoutingError::ActionNotFound {
            prefix: module.prefix().to_string(),
            path: path.to_string(),
        })
}

/// Named forward: the action's own first, then the module's global ones.
pub fn resolve_forward<'m>(
    module: &'m ModuleConfig,
    action: &'m ActionConfig,
    name: &str,
) -> Result<&'m ForwardConfig, RoutingError> {
    action
        .find_forward_config(name)
        .or_else(|| module.find_forward_config(name))
        .ok_or_else(|| RoutingError::UnresolvableForward {
            prefix: module.prefix().to_string(),
            path: action.path().to_string(),
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{factory, operation, ActionError, DispatchAction, FnAction};
    use crate::builder::ConfigBuilder;
    use crate::cache::ModuleConfigCache;
    use crate::http::{SimpleRequest, SimpleResponse};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const MAIN: &str = r#"<module-config>
  <form-beans>
    <form-bean name="loginForm">
      <form-property name="username" initial="guest"/>
    </form-bean>
  </form-beans>
  <global-forwards>
    <forward name="success" path="/global.jsp"/>
    <forward name="home" path="/index.jsp"/>
  </global-forwards>
  <action-mappings>
    <action path="/login" type="login" name="loginForm">
      <forward name="success" path="/welcome.jsp"/>
    </action>
    <action path="/go" type="login">
      <forward name="other" path="/other.jsp"/>
    </action>
    <action path="/orders" type="orders" parameter="method"/>
    <action path="/about" forward="/about.jsp"/>
    <action path="/static" type="forward" parameter="/static.jsp"/>
    <action path="/bare"/>
    <action path="/broken" type="missing"/>
    <action path="/orphan" type="login" name="noSuchForm"/>
  </action-mappings>
</module-config>"#;

    const ADMIN: &str = r#"<module-config>
  <action-mappings>
    <action path="/login" forward="/admin-login.jsp"/>
  </action-mappings>
</module-config>"#;

    struct Fixture {
        _dir: TempDir,
        router: DispatchRouter,
        constructions: Arc<AtomicUsize>,
    }

    fn fixture(mapping: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main.xml");
        let admin = dir.path().join("admin.xml");
        fs::write(&main, MAIN).unwrap();
        fs::write(&admin, ADMIN).unwrap();

        let cache = Arc::new(ModuleConfigCache::new(dir.path().join("cache"), Arc::new(ConfigBuilder::new())));
        let catalog = Arc::new(ModuleCatalog::new(
            cache,
            vec![(String::new(), vec![main]), ("/admin".to_string(), vec![admin])],
        ));

        let constructions = Arc::new(AtomicUsize::new(0));
        let counter = constructions.clone();
        let mut registry = HandlerRegistry::new();
        registry.register(
            "login",
            factory(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(FnAction::new(operation(|_, form, request, _| {
                    let user = form.and_then(|f| f.get("username")).unwrap_or("anonymous").to_string();
                    request.set_attribute("user", user);
                    let target = request.parameter("to").unwrap_or("success").to_string();
                    Ok(Some(ActionForward::Named(target)))
                }))) as Arc<dyn ActionHandler>)
            }),
        );
        registry.register(
            "orders",
            factory(|_| {
                Ok(Arc::new(DispatchAction::new().operation(
                    "fail",
                    operation(|_, _, _, _| Err(ActionError::handler(std::io::Error::other("db down")))),
                )) as Arc<dyn ActionHandler>)
            }),
        );

        let settings = DispatchConfig {
            mapping: mapping.to_string(),
            ..DispatchConfig::default()
        };
        let router = DispatchRouter::new(catalog, registry, settings).unwrap();
        Fixture {
            _dir: dir,
            router,
            constructions,
        }
    }

    fn dispatch(router: &DispatchRouter, request: &mut SimpleRequest) -> Result<DispatchOutcome, DispatchError> {
        router.dispatch(request, &mut SimpleResponse::new())
    }

    fn forward_path(outcome: DispatchOutcome) -> String {
        match outcome {
            DispatchOutcome::Forward(fc) => fc.path().to_string(),
            DispatchOutcome::Completed => panic!("expected a forward"),
        }
    }

    #[test]
    fn test_local_forward_wins_over_global() {
        let f = fixture("*.do");
        let outcome = dispatch(&f.router, &mut SimpleRequest::new("/login.do")).unwrap();
        assert_eq!(forward_path(outcome), "/welcome.jsp");
    }

    #[test]
    fn test_global_forward_fallback_and_unresolvable() {
        let f = fixture("*.do");
        let outcome = dispatch(&f.router, &mut SimpleRequest::new("/go.do")).unwrap();
        assert_eq!(forward_path(outcome), "/global.jsp");

        let err = dispatch(&f.router, &mut SimpleRequest::new("/go.do").with_param("to", "nowhere")).unwrap_err();
        assert!(matches!(err, DispatchError::Routing(RoutingError::UnresolvableForward { .. })));
    }

    #[test]
    fn test_form_bound_from_request() {
        let f = fixture("*.do");
        let mut request = SimpleRequest::new("/login.do");
        dispatch(&f.router, &mut request).unwrap();
        assert_eq!(request.attribute("user"), Some("guest"));

        let mut request = SimpleRequest::new("/login.do").with_param("username", "ann");
        dispatch(&f.router, &mut request).unwrap();
        assert_eq!(request.attribute("user"), Some("ann"));
    }

    #[test]
    fn test_handler_constructed_once_per_module() {
        let f = fixture("*.do");
        for _ in 0..3 {
            dispatch(&f.router, &mut SimpleRequest::new("/login.do")).unwrap();
            dispatch(&f.router, &mut SimpleRequest::new("/go.do")).unwrap();
        }
        assert_eq!(f.constructions.load(Ordering::SeqCst), 1);

        let a = f.router.handler_for("", "login").unwrap();
        let b = f.router.handler_for("", "login").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        f.router.handler_for("/admin", "login").unwrap();
        assert_eq!(f.constructions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_routing_errors() {
        let f = fixture("*.do");
        let cases = [
            ("/missing.do", "ActionNotFound"),
            ("/bare.do", "NoHandler"),
            ("/broken.do", "HandlerConstruction"),
            ("/orphan.do", "FormBeanNotFound"),
            ("/login.jsp", "Unmapped"),
        ];
        for (path, expected) in cases {
            let err = dispatch(&f.router, &mut SimpleRequest::new(path)).unwrap_err();
            let DispatchError::Routing(routing) = &err else {
                panic!("{path}: expected routing error, got {err}");
            };
            assert!(format!("{routing:?}").starts_with(expected), "{path}: {routing:?}");
        }
        let err = dispatch(&f.router, &mut SimpleRequest::new("/missing.do")).unwrap_err();
        assert_eq!(err.status().http_status(), 404);
    }

    #[test]
    fn test_direct_and_static_forwards() {
        let f = fixture("*.do");
        assert_eq!(forward_path(dispatch(&f.router, &mut SimpleRequest::new("/about.do")).unwrap()), "/about.jsp");
        assert_eq!(forward_path(dispatch(&f.router, &mut SimpleRequest::new("/static.do")).unwrap()), "/static.jsp");
    }

    #[test]
    fn test_handler_errors_pass_through() {
        let f = fixture("*.do");
        let err = dispatch(&f.router, &mut SimpleRequest::new("/orders.do").with_param("method", "fail")).unwrap_err();
        match err {
            DispatchError::Action(ActionError::Handler(inner)) => assert_eq!(inner.to_string(), "db down"),
            other => panic!("unexpected error {other}"),
        }

        let err = dispatch(&f.router, &mut SimpleRequest::new("/orders.do").with_param("method", "perform")).unwrap_err();
        assert!(matches!(err, DispatchError::Action(ActionError::RecursiveDispatch { .. })));
    }

    #[test]
    fn test_module_selection_and_path_mapping() {
        let f = fixture("/do/*");
        let outcome = dispatch(&f.router, &mut SimpleRequest::new("/admin/do/login")).unwrap();
        assert_eq!(forward_path(outcome), "/admin-login.jsp");

        let outcome = dispatch(&f.router, &mut SimpleRequest::new("/do/login")).unwrap();
        assert_eq!(forward_path(outcome), "/welcome.jsp");
    }

    #[test]
    fn test_invalid_mapping_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(ModuleConfigCache::new(dir.path(), Arc::new(ConfigBuilder::new())));
        let catalog = Arc::new(ModuleCatalog::new(cache, Vec::new()));
        let settings = DispatchConfig {
            mapping: "bogus".into(),
            ..DispatchConfig::default()
        };
        assert!(DispatchRouter::new(catalog, HandlerRegistry::new(), settings).is_err());
    }
}
