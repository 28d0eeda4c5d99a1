//! Routing and dispatch errors.

use thiserror::Error;
use crate::action::ActionError;
use crate::cache::CacheError;

/// Coarse response category for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    NotFound,
    BadRequest,
    Internal,
}

impl StatusClass {
    /// Conventional HTTP status for the category.
    pub fn http_status(self) -> u16 {
        match self {
            StatusClass::NotFound => 404,
            StatusClass::BadRequest => 400,
            StatusClass::Internal => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no module is configured with prefix '{prefix}'")]
    ModuleNotFound { prefix: String },

    #[error("request path {path} does not match the request mapping")]
    Unmapped { path: String },

    #[error("module '{prefix}' has no action mapped to {path}")]
    ActionNotFound { prefix: String, path: String },

    #[error("action {path} in module '{prefix}' declares neither a handler type nor a forward")]
    NoHandler { prefix: String, path: String },

    #[error("cannot construct handler '{handler_type}' for module '{prefix}': {message}")]
    HandlerConstruction {
        prefix: String,
        handler_type: String,
        message: String,
    },

    #[error("action {path} in module '{prefix}' references unknown form bean '{name}'")]
    FormBeanNotFound { prefix: String, path: String, name: String },

    #[error("forward '{name}' returned by action {path} in module '{prefix}' matches no local or global forward")]
    UnresolvableForward { prefix: String, path: String, name: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl RoutingError {
    pub fn status(&self) -> StatusClass {
        match self {
            RoutingError::ModuleNotFound { .. }
            | RoutingError::Unmapped { .. }
            | RoutingError::ActionNotFound { .. } => StatusClass::NotFound,
            RoutingError::NoHandler { .. }
            | RoutingError::HandlerConstruction { .. }
            | RoutingError::FormBeanNotFound { .. }
            | RoutingError::UnresolvableForward { .. }
            | RoutingError::Cache(_) => StatusClass::Internal,
        }
    }
}

/// Everything a dispatch can fail with.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Raised by the handler; passed through untouched.
    #[error(transparent)]
    Action(#[from] ActionError),
}

impl DispatchError {
    pub fn status(&self) -> StatusClass {
        match self {
            DispatchError::Routing(e) => e.status(),
            DispatchError::Action(ActionError::RecursiveDispatch { .. }) => StatusClass::BadRequest,
            DispatchError::Action(_) => StatusClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = RoutingError::ActionNotFound {
            prefix: String::new(),
            path: "/nope".into(),
        };
        assert_eq!(not_found.status(), StatusClass::NotFound);
        assert_eq!(not_found.status().http_status(), 404);

        let construction = RoutingError::HandlerConstruction {
            prefix: "/admin".into(),
            handler_type: "missing".into(),
            message: "no factory".into(),
        };
        assert_eq!(construction.status(), StatusClass::Internal);

        let recursive = DispatchError::from(ActionError::RecursiveDispatch {
            path: "/a".into(),
            operation: "execute".into(),
        });
        assert_eq!(recursive.status(), StatusClass::BadRequest);
    }
}
