//! Subprocess measurement engine for powersweep.
//!
//! Given a fully-formed external command and a repetition count, the
//! sampler executes it N times and captures, per execution:
//!
//! - elapsed/user/system time, via a `/usr/bin/time` wrapper writing a
//!   fixed-format transient file ([`timewrap`]);
//! - package and core energy deltas, via before/after snapshots of the
//!   RAPL counters with wraparound correction ([`rapl`]);
//! - hardware performance counters, parsed from the trailing summary
//!   lines of a `perf stat` wrapper ([`perf`]).
//!
//! The composed command is `perf stat .. /usr/bin/time .. <tool argv>`,
//! so the profiler sees the whole child tree while the time side channel
//! stays out of the tool's own output.
//!
//! ## Failure policy
//!
//! A missing or unreadable energy interface is a configuration error
//! caught by [`EnergyProbe::open`] before any sweep starts. A parse
//! failure on either side channel is fatal for the whole sweep: no
//! retries, since every external invocation consumes real wall time and
//! re-running one would corrupt the timing statistics.

mod error;
pub mod perf;
pub mod rapl;
mod sampler;
pub mod timewrap;

pub use error::SamplerError;
pub use rapl::{EnergyProbe, EnergySnapshot};
pub use sampler::{RunOutcome, Sampler};
