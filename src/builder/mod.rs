//! Module configuration builder.
//!
//! # Data Flow
//! ```text
//! source documents (XML, one or more per module prefix)
//!     → driver.rs (stream events, explicit frame stack)
//!     → rules.rs (element path → create / set-property / structural rule)
//!     → ModuleConfig (populated, still mutable)
//!     → caller freezes once all documents are applied
//! ```
//!
//! # Design Decisions
//! - One ModuleConfig per build; documents are applied in order to the same
//!   open module
//! - Instantiation failures are collected across all documents and reported
//!   once, so a partially built module is never handed out
//! - An empty module is a failure, not a valid result

pub mod driver;
pub mod error;
pub mod rules;

use std::fs;
use std::path::PathBuf;
use crate::builder::driver::{Failure, Walker};
use crate::model::ModuleConfig;

pub use error::BuildError;
pub use rules::{ConfigClassRegistry, ObjectKind, Rule};

/// Translates module documents into a [`ModuleConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    classes: ConfigClassRegistry,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a registry that knows application-specific config classes.
    pub fn with_classes(classes: ConfigClassRegistry) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ConfigClassRegistry {
        &self.classes
    }

    /// Build the module for `prefix` from the given files, in order.
    ///
    /// The returned module is not frozen.
    pub fn build(&self, prefix: &str, sources: &[PathBuf]) -> Result<ModuleConfig, BuildError> {
        tracing::info!(prefix, documents = sources.len(), "Building module configuration");

        let mut documents = Vec::with_capacity(sources.len());
        for path in sources {
            let content = fs::read_to_string(path).map_err(|source| BuildError::Io {
                path: path.clone(),
                source,
            })?;
            documents.push((path.display().to_string(), content));
        }

        self.build_documents(
            prefix,
            documents.iter().map(|(name, xml)| (name.as_str(), xml.as_str())),
        )
    }

    /// Build from in-memory `(document name, xml)` pairs.
    pub fn build_documents<'d>(
        &self,
        prefix: &str,
        documents: impl IntoIterator<Item = (&'d str, &'d str)>,
    ) -> Result<ModuleConfig, BuildError> {
        let mut module = ModuleConfig::new(prefix);
        let mut failures: Vec<Failure> = Vec::new();

        for (name, xml) in documents {
            tracing::debug!(prefix, document = name, "Applying config document");
            Walker::new(&self.classes, &mut failures, name).walk(&mut module, xml)?;
        }

        if let Some(first) = failures.first() {
            return Err(BuildError::Instantiation {
                prefix: prefix.to_string(),
                class: first.class.clone(),
                element: first.element.clone(),
                document: first.document.clone(),
                count: failures.len(),
            });
        }
        if module.is_empty() {
            return Err(BuildError::EmptyModule {
                prefix: prefix.to_string(),
            });
        }

        tracing::info!(
            prefix,
            actions = module.action_configs().count(),
            forwards = module.forward_configs().count(),
            "Module configuration built"
        );
        Ok(module)
    }
}
