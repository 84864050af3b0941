//! Error types for the powersweep-store crate.

use std::backtrace::Backtrace;
use std::fmt;

use powersweep_space::SpaceError;

/// Error type for result persistence.
#[derive(Debug)]
pub struct StoreError {
    kind: StoreErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum StoreErrorKind {
    /// I/O error reading or writing the persisted file.
    Io(std::io::Error),
    /// A record deviates from the positional format.
    Format { line: usize, message: String },
    /// A stored key could not be mapped back through the metric space.
    Encoding(SpaceError),
}

impl StoreError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Format {
            line,
            message: message.into(),
        })
    }

    /// Returns true if this error is due to file I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Io(_))
    }

    /// Returns true if this error is due to a malformed record.
    pub fn is_format(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Format { .. })
    }

    /// Returns true if this error is due to a key encoding mismatch.
    pub fn is_encoding(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Encoding(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorKind::Io(err) => write!(f, "result file I/O error: {err}"),
            StoreErrorKind::Format { line, message } => {
                write!(f, "malformed record on line {line}: {message}")
            }
            StoreErrorKind::Encoding(err) => {
                write!(f, "stored key does not match the metric space: {err}")
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            StoreErrorKind::Io(err) => Some(err),
            StoreErrorKind::Encoding(err) => Some(err),
            StoreErrorKind::Format { .. } => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::new(StoreErrorKind::Io(err))
    }
}

impl From<SpaceError> for StoreError {
    fn from(err: SpaceError) -> Self {
        Self::new(StoreErrorKind::Encoding(err))
    }
}
