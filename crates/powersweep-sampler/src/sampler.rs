//! The repetition loop: execute, snapshot, parse, merge.
//!
//! One [`Sampler`] drives every measurement of a sweep. For each
//! repetition it snapshots the energy counters, runs the composed command
//! (profiler around time wrapper around tool), snapshots again, parses
//! both side channels, and merges everything into one observation.
//!
//! Execution is strictly sequential: the energy counters and the time
//! side channel are process-wide, unsynchronized resources, so overlapping
//! runs would corrupt each other's readings. Cancellation is honored only
//! between repetitions; the per-repetition temp file is an RAII guard, so
//! the side channel is removed on every exit path, parse failures
//! included.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use powersweep_schemas::Observation;
use tracing::{debug, warn};

use crate::error::{SamplerError, SamplerErrorKind};
use crate::perf;
use crate::rapl::EnergyProbe;
use crate::timewrap;

/// Per-tool capture files for the benchmarked command's own output.
///
/// Appended across repetitions so a whole sweep's tool output lands in
/// `<tool>.out` / `<tool>.err` for post-hoc inspection.
#[derive(Debug)]
struct CaptureFiles {
    out: fs::File,
    err: fs::File,
}

/// The result of sampling one parameter point.
#[derive(Debug)]
pub struct RunOutcome {
    /// One observation per completed repetition, in execution order.
    pub observations: Vec<Observation>,
    /// True if cancellation cut the run short; the observations gathered
    /// so far are still valid.
    pub interrupted: bool,
}

/// Drives repeated executions of external commands and collects
/// observations.
pub struct Sampler {
    probe: EnergyProbe,
    events: Vec<String>,
    cancel: Arc<AtomicBool>,
    /// Minimum percent-of-events-captured seen across the whole sweep.
    confidence: f64,
    capture: Option<CaptureFiles>,
}

impl Sampler {
    /// Creates a sampler over an opened energy probe.
    ///
    /// `cancel` is the cooperative interrupt flag, consulted between
    /// repetitions only, never mid-execution.
    pub fn new(
        probe: EnergyProbe,
        events: Vec<String>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            probe,
            events,
            cancel,
            confidence: 100.0,
            capture: None,
        }
    }

    /// Appends the benchmarked command's stdout/stderr to
    /// `<dir>/<tool>.out` and `<dir>/<tool>.err`.
    pub fn with_capture(
        mut self,
        dir: &Path,
        tool: &str,
    ) -> Result<Self, SamplerError> {
        let open = |suffix: &str| {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(format!("{tool}.{suffix}")))
        };
        self.capture = Some(CaptureFiles {
            out: open("out")?,
            err: open("err")?,
        });
        Ok(self)
    }

    /// Executes `command` `repetitions` times, measuring each run.
    ///
    /// Returns early with `interrupted = true` when the cancel flag is
    /// raised; any parse failure aborts the whole sweep instead (a
    /// partially measured repetition would silently undercount).
    pub fn run(
        &mut self,
        command: &[String],
        repetitions: u32,
    ) -> Result<RunOutcome, SamplerError> {
        let mut observations = Vec::with_capacity(repetitions as usize);
        for repetition in 0..repetitions {
            if self.cancel.load(Ordering::SeqCst) {
                return Ok(RunOutcome {
                    observations,
                    interrupted: true,
                });
            }
            debug!(repetition, ?command, "measuring");
            observations.push(self.measure_once(command)?);
        }
        Ok(RunOutcome {
            observations,
            interrupted: false,
        })
    }

    /// One repetition: energy snapshots around the composed command, then
    /// both side channels parsed and merged.
    fn measure_once(
        &mut self,
        command: &[String],
    ) -> Result<Observation, SamplerError> {
        // The guard deletes the side channel on drop, including the error
        // paths below: a stale file must never leak into the next
        // repetition's parse.
        let time_file = tempfile::Builder::new()
            .prefix("powersweep-time-")
            .suffix(".txt")
            .tempfile()?;

        let mut argv = perf::wrapper_args(&self.events);
        argv.extend(timewrap::wrapper_args(time_file.path()));
        argv.extend(command.iter().cloned());

        let before = self.probe.snapshot()?;
        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .map_err(|err| SamplerError::new(SamplerErrorKind::Spawn(err)))?;
        let after = self.probe.snapshot()?;

        // The exit code is recorded but not validated: a failing command
        // still produces a record, with possibly nonsensical metrics.
        if !output.status.success() {
            warn!(status = %output.status, "benchmarked command failed");
        }

        if let Some(capture) = &mut self.capture {
            capture.out.write_all(&output.stdout)?;
            capture.err.write_all(&output.stderr)?;
        }

        let energy = self.probe.delta(before, after);

        let time_content = fs::read_to_string(time_file.path())?;
        let time = timewrap::parse_output(&time_content)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let readings = perf::parse_summary(&stderr, self.events.len())?;
        for (reading, requested) in readings.iter().zip(&self.events) {
            if !reading.event.starts_with(requested.as_str()) {
                debug!(
                    requested,
                    reported = reading.event,
                    "perf event name differs from request"
                );
            }
            if reading.captured_pct < self.confidence {
                self.confidence = reading.captured_pct;
            }
        }

        Ok(Observation {
            time,
            energy,
            counters: readings.iter().map(|r| r.value).collect(),
        })
    }

    /// Minimum percent-of-events-captured across every repetition so far.
    ///
    /// Below 100 means the profiler multiplexed counters and the counter
    /// metrics are extrapolated. A warning, not an error.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// True once the cancel flag has been raised.
    pub fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("events", &self.events)
            .field("confidence", &self.confidence)
            .finish_non_exhaustive()
    }
}
