//! Handler type name → factory.
//!
//! # Design Decisions
//! - Handler types are names registered up front instead of classes loaded
//!   at runtime
//! - Factories get an explicit context (catalog and dispatch settings)
//! - `forward` and `switch` are always available

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use crate::action::forward::ForwardAction;
use crate::action::switch::SwitchAction;
use crate::action::ActionHandler;
use crate::config::DispatchConfig;
use crate::routing::ModuleCatalog;

/// Collaborators available to handler factories.
#[derive(Clone)]
pub struct HandlerContext {
    pub catalog: Arc<ModuleCatalog>,
    pub settings: DispatchConfig,
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

pub type HandlerFactory = Arc<dyn Fn(&HandlerContext) -> Result<Arc<dyn ActionHandler>, String> + Send + Sync>;

/// Wraps a closure as a [`HandlerFactory`].
pub fn factory<F>(f: F) -> HandlerFactory
where
    F: Fn(&HandlerContext) -> Result<Arc<dyn ActionHandler>, String> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub const FORWARD_HANDLER: &str = "forward";
pub const SWITCH_HANDLER: &str = "switch";

#[derive(Clone)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// Registry holding only the built-in handlers.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register(
            FORWARD_HANDLER,
            factory(|_| Ok(Arc::new(ForwardAction::new()) as Arc<dyn ActionHandler>)),
        );
        registry.register(
            SWITCH_HANDLER,
            factory(|ctx| {
                Ok(Arc::new(SwitchAction::new(ctx.catalog.clone(), &ctx.settings)) as Arc<dyn ActionHandler>)
            }),
        );
        registry
    }

    /// Register `handler_type`. A previous registration is replaced.
    pub fn register(&mut self, handler_type: impl Into<String>, factory: HandlerFactory) {
        self.factories.insert(handler_type.into(), factory);
    }

    pub fn contains(&self, handler_type: &str) -> bool {
        self.factories.contains_key(handler_type)
    }

    pub fn handler_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Construct a new handler instance.
    pub fn create(&self, handler_type: &str, ctx: &HandlerContext) -> Result<Arc<dyn ActionHandler>, String> {
        let factory = self
            .factories
            .get(handler_type)
            .ok_or_else(|| format!("no handler registered under '{handler_type}'"))?;
        factory(ctx)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.handler_types().collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry").field("handler_types", &types).finish()
    }
}
