//! Error types for the powersweep-space crate.

use std::backtrace::Backtrace;
use std::fmt;

/// Error type for encoding and decoding operations.
///
/// Domain errors abort a sweep (an unrecognized parameter value means the
/// tool description and the tuple disagree); invalid-encoding errors signal
/// a corrupted or mismatched feature vector on decode.
#[derive(Debug)]
pub struct SpaceError {
    kind: SpaceErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum SpaceErrorKind {
    /// A tuple value is absent from its axis's declared domain and is not
    /// parseable as a raw number.
    Domain { axis: String, value: String },
    /// A one-hot categorical block does not have exactly one active
    /// indicator.
    InvalidEncoding { axis: String, active: usize },
    /// Tuple or vector length does not match the declared axes.
    Arity { expected: usize, got: usize },
}

impl SpaceError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: SpaceErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if this error is due to an out-of-domain value.
    pub fn is_domain(&self) -> bool {
        matches!(self.kind, SpaceErrorKind::Domain { .. })
    }

    /// Returns true if this error is due to a corrupted one-hot vector.
    pub fn is_invalid_encoding(&self) -> bool {
        matches!(self.kind, SpaceErrorKind::InvalidEncoding { .. })
    }

    /// Returns true if this error is due to a length mismatch.
    pub fn is_arity(&self) -> bool {
        matches!(self.kind, SpaceErrorKind::Arity { .. })
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for SpaceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceErrorKind::Domain { axis, value } => write!(
                f,
                "value `{value}` is not in the domain of axis `{axis}` \
                 and is not a number"
            ),
            SpaceErrorKind::InvalidEncoding { axis, active } => write!(
                f,
                "one-hot block for axis `{axis}` has {active} active \
                 indicators, expected exactly 1"
            ),
            SpaceErrorKind::Arity { expected, got } => {
                write!(f, "expected {expected} elements, got {got}")
            }
        }
    }
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for SpaceError {}
