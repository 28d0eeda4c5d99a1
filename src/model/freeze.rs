//! Freeze discipline shared by every config object.
//!
//! # Design Decisions
//! - The frozen flag is a plain `bool` on each object; it serializes with the
//!   object so a deserialized snapshot comes back already frozen
//! - Mutators check the flag before touching any field, so a rejected call
//!   leaves the object exactly as it was

use std::fmt;
use thiserror::Error;

/// Raised by any mutator invoked on a frozen config object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} '{key}' is frozen and cannot be modified")]
pub struct FrozenError {
    /// Config object type, e.g. `ActionConfig`.
    pub kind: &'static str,
    /// Identifying key of the object (path, name, prefix...).
    pub key: String,
}

/// Fail with [`FrozenError`] when `frozen` is set.
pub(crate) fn ensure_mutable(frozen: bool, kind: &'static str, key: &str) -> Result<(), FrozenError> {
    if frozen {
        tracing::warn!(kind, key, "Rejected mutation of frozen config object");
        return Err(FrozenError {
            kind,
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Writes the `TypeName[attr="value",flag=true]` rendering used by every
/// config object's `Display` impl.
pub(crate) struct Render<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    first: bool,
}

impl<'a, 'b> Render<'a, 'b> {
    pub(crate) fn new(f: &'a mut fmt::Formatter<'b>, kind: &str) -> Result<Self, fmt::Error> {
        write!(f, "{kind}[")?;
        Ok(Self { f, first: true })
    }

    fn sep(&mut self) -> fmt::Result {
        if !self.first {
            self.f.write_str(",")?;
        }
        self.first = false;
        Ok(())
    }

    pub(crate) fn text(&mut self, key: &str, value: &str) -> fmt::Result {
        self.sep()?;
        write!(self.f, "{key}={value:?}")
    }

    /// Absent values are skipped entirely.
    pub(crate) fn opt(&mut self, key: &str, value: Option<&str>) -> fmt::Result {
        match value {
            Some(v) => self.text(key, v),
            None => Ok(()),
        }
    }

    pub(crate) fn flag(&mut self, key: &str, value: bool) -> fmt::Result {
        self.sep()?;
        write!(self.f, "{key}={value}")
    }

    pub(crate) fn count(&mut self, key: &str, value: usize) -> fmt::Result {
        self.sep()?;
        write!(self.f, "{key}={value}")
    }

    pub(crate) fn finish(self) -> fmt::Result {
        self.f.write_str("]")
    }
}
