//! Errors raised while building a module configuration.

use std::path::PathBuf;
use thiserror::Error;
use crate::model::FrozenError;

/// A build attempt failed. The attempt's partial module must be discarded.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A source document could not be read.
    #[error("failed to read config document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed or violates the element structure.
    #[error("malformed config document {document}: {message}")]
    Malformed { document: String, message: String },

    /// A required attribute is absent.
    #[error("<{element}> in {document} is missing required attribute '{attribute}'")]
    MissingAttribute {
        document: String,
        element: String,
        attribute: &'static str,
    },

    /// An attribute value could not be converted.
    #[error("invalid value '{value}' for <{element} {attribute}> in {document}")]
    InvalidAttribute {
        document: String,
        element: String,
        attribute: String,
        value: String,
    },

    /// One or more config classes could not be instantiated.
    #[error("{count} config object(s) in module '{prefix}' could not be instantiated (first: class '{class}' for <{element}> in {document})")]
    Instantiation {
        prefix: String,
        class: String,
        element: String,
        document: String,
        count: usize,
    },

    /// The documents declared nothing for the module.
    #[error("module '{prefix}' produced an empty configuration")]
    EmptyModule { prefix: String },

    #[error(transparent)]
    Frozen(#[from] FrozenError),
}

impl BuildError {
    pub(crate) fn malformed(document: &str, message: impl Into<String>) -> Self {
        BuildError::Malformed {
            document: document.to_string(),
            message: message.into(),
        }
    }
}
