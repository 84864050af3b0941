//! Error types for the powersweep-model crate.

use std::backtrace::Backtrace;
use std::fmt;

use powersweep_space::SpaceError;

/// Error type for the splitting and training phases.
///
/// Per-metric fit failures are *not* represented here: a singular system
/// is fatal for that metric's predictions only and is carried alongside
/// the successful models in [`MetricModels`](crate::MetricModels).
#[derive(Debug)]
pub struct ModelError {
    kind: ModelErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum ModelErrorKind {
    /// The training percentage is outside [1, 100].
    Percentage(u32),
    /// A stored tuple could not be encoded for the regression engine.
    Encoding(SpaceError),
}

impl ModelError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: ModelErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if this error is due to an out-of-range percentage.
    pub fn is_percentage(&self) -> bool {
        matches!(self.kind, ModelErrorKind::Percentage(_))
    }

    /// Returns true if this error is due to a tuple encoding failure.
    pub fn is_encoding(&self) -> bool {
        matches!(self.kind, ModelErrorKind::Encoding(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for ModelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErrorKind::Percentage(value) => {
                write!(f, "training percentage {value} is outside [1, 100]")
            }
            ModelErrorKind::Encoding(err) => {
                write!(f, "failed to encode a stored tuple: {err}")
            }
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ModelErrorKind::Encoding(err) => Some(err),
            ModelErrorKind::Percentage(_) => None,
        }
    }
}

impl From<SpaceError> for ModelError {
    fn from(err: SpaceError) -> Self {
        Self::new(ModelErrorKind::Encoding(err))
    }
}
