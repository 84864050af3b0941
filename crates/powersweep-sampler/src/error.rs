//! Error types for the powersweep-sampler crate.

use std::backtrace::Backtrace;
use std::fmt;
use std::path::PathBuf;

/// Error type for measurement operations.
///
/// Energy-interface failures are configuration errors caught by the
/// preflight check before any sweep starts. Parse failures on the time or
/// perf side channels are fatal for the whole sweep: a single malformed
/// read would silently drop the measurement count for that parameter point
/// below the nominal repetition count, so nothing is retried or skipped.
#[derive(Debug)]
pub struct SamplerError {
    kind: SamplerErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum SamplerErrorKind {
    /// An energy counter file could not be read.
    EnergyInterface {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An energy counter file did not contain a single integer.
    EnergyFormat { path: PathBuf, content: String },
    /// The composed measurement command could not be spawned.
    Spawn(std::io::Error),
    /// I/O error on a side-channel or capture file.
    Io(std::io::Error),
    /// The time wrapper's side channel was not `user,sys,elapsed`.
    TimeFormat { content: String },
    /// The profiler's summary lines could not be parsed.
    PerfFormat { message: String },
}

impl SamplerError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: SamplerErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn time_format(content: impl Into<String>) -> Self {
        Self::new(SamplerErrorKind::TimeFormat {
            content: content.into(),
        })
    }

    pub(crate) fn perf_format(message: impl Into<String>) -> Self {
        Self::new(SamplerErrorKind::PerfFormat {
            message: message.into(),
        })
    }

    /// Returns true if the energy-counter interface is missing or
    /// unreadable, the fatal precondition checked before a sweep.
    pub fn is_energy_interface(&self) -> bool {
        matches!(
            self.kind,
            SamplerErrorKind::EnergyInterface { .. }
                | SamplerErrorKind::EnergyFormat { .. }
        )
    }

    /// Returns true if the measurement command could not be spawned.
    pub fn is_spawn(&self) -> bool {
        matches!(self.kind, SamplerErrorKind::Spawn(_))
    }

    /// Returns true if this error is due to side-channel file I/O.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, SamplerErrorKind::Io(_))
    }

    /// Returns true if the time side channel was malformed.
    pub fn is_time_format(&self) -> bool {
        matches!(self.kind, SamplerErrorKind::TimeFormat { .. })
    }

    /// Returns true if the profiler summary was malformed.
    pub fn is_perf_format(&self) -> bool {
        matches!(self.kind, SamplerErrorKind::PerfFormat { .. })
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for SamplerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerErrorKind::EnergyInterface { path, source } => write!(
                f,
                "energy counter `{}` is unreadable: {source}",
                path.display()
            ),
            SamplerErrorKind::EnergyFormat { path, content } => write!(
                f,
                "energy counter `{}` is not an integer: `{content}`",
                path.display()
            ),
            SamplerErrorKind::Spawn(err) => {
                write!(f, "failed to spawn measurement command: {err}")
            }
            SamplerErrorKind::Io(err) => {
                write!(f, "side-channel I/O error: {err}")
            }
            SamplerErrorKind::TimeFormat { content } => {
                write!(f, "malformed time output: `{content}`")
            }
            SamplerErrorKind::PerfFormat { message } => {
                write!(f, "malformed perf summary: {message}")
            }
        }
    }
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for SamplerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            SamplerErrorKind::EnergyInterface { source, .. } => Some(source),
            SamplerErrorKind::Spawn(err) | SamplerErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SamplerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(SamplerErrorKind::Io(err))
    }
}
