//! Error types for the powersweep-schemas crate.

use std::backtrace::Backtrace;
use std::fmt;

/// Error type for tool description loading and validation.
///
/// Covers failures that occur before any measurement starts: unreadable
/// configuration files, malformed JSON, and descriptions that violate the
/// structural rules (empty domains, duplicate axis names, unresolvable
/// command placeholders). All of these are configuration errors: they
/// abort the run during preflight, never mid-sweep.
#[derive(Debug)]
pub struct SchemaError {
    kind: SchemaErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum SchemaErrorKind {
    /// I/O error reading a tool description file.
    Io(std::io::Error),
    /// Failed to deserialize a tool description from JSON.
    Deserialization(serde_json::Error),
    /// The description is structurally invalid.
    Validation(String),
}

impl SchemaError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: SchemaErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Validation(message.into()))
    }

    /// Returns true if this error is due to file I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, SchemaErrorKind::Io(_))
    }

    /// Returns true if this error is due to JSON deserialization failure.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, SchemaErrorKind::Deserialization(_))
    }

    /// Returns true if this error is due to a validation rule.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, SchemaErrorKind::Validation(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaErrorKind::Io(err) => {
                write!(f, "failed to read tool description: {err}")
            }
            SchemaErrorKind::Deserialization(err) => {
                write!(f, "failed to parse tool description: {err}")
            }
            SchemaErrorKind::Validation(msg) => {
                write!(f, "invalid tool description: {msg}")
            }
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            SchemaErrorKind::Io(err) => Some(err),
            SchemaErrorKind::Deserialization(err) => Some(err),
            SchemaErrorKind::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        Self::new(SchemaErrorKind::Io(err))
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(SchemaErrorKind::Deserialization(err))
    }
}
