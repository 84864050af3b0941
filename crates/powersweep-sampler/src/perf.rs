//! The hardware-counter profiler wrapper and its summary format.
//!
//! `perf stat --field-separator , --event <e1,..,ek>` prefixes the
//! benchmarked command and appends its summary to stderr, after whatever
//! the tool itself wrote there. With *k* requested events the summary is
//! exactly the last *k* lines, one per event in request order:
//!
//! ```text
//! 1024,,context-switches,2014716321,100.00,,
//! ```
//!
//! Fields are comma separated with empties interspersed (units the event
//! does not carry). After dropping empties the layout is fixed:
//! `value, event-name, running-time, percent-captured[.fraction], ..`.
//! The percent is how much of the run the counter was actually scheduled
//! on the PMU; anything below 100 means multiplexed, undersampled data.

use crate::error::SamplerError;

/// Profiler binary, resolved through `PATH`.
pub const PERF_BINARY: &str = "perf";

/// One parsed summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterReading {
    /// Event name as printed by the profiler.
    pub event: String,
    /// Counted value.
    pub value: u64,
    /// Percentage of the run the event was actually measured.
    pub captured_pct: f64,
}

/// Builds the profiler prefix for the requested events.
pub fn wrapper_args(events: &[String]) -> Vec<String> {
    vec![
        PERF_BINARY.to_owned(),
        "stat".to_owned(),
        "--field-separator".to_owned(),
        ",".to_owned(),
        "--event".to_owned(),
        events.join(","),
    ]
}

/// Extracts the last `events` summary lines from the profiler's stderr.
///
/// Returns one reading per event in output order. Any deviation from the
/// fixed field layout is fatal: a malformed summary means this repetition's
/// counters are unaccounted for, and the sweep's measurement counts would
/// silently drift if it were skipped.
pub fn parse_summary(
    stderr: &str,
    events: usize,
) -> Result<Vec<CounterReading>, SamplerError> {
    let lines: Vec<&str> = stderr.lines().collect();
    if lines.len() < events {
        return Err(SamplerError::perf_format(format!(
            "expected {events} summary lines, stderr has {}",
            lines.len()
        )));
    }

    lines[lines.len() - events..]
        .iter()
        .map(|line| parse_line(line))
        .collect()
}

fn parse_line(line: &str) -> Result<CounterReading, SamplerError> {
    let fields: Vec<&str> = line
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() < 4 {
        return Err(SamplerError::perf_format(format!(
            "summary line has {} fields: `{line}`",
            fields.len()
        )));
    }

    let value = fields[0].parse::<u64>().map_err(|_| {
        SamplerError::perf_format(format!("bad counter value in `{line}`"))
    })?;
    let captured_pct = fields[3].parse::<f64>().map_err(|_| {
        SamplerError::perf_format(format!("bad capture percentage in `{line}`"))
    })?;

    Ok(CounterReading {
        event: fields[1].to_owned(),
        value,
        captured_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tool noise followed by a three-event summary, as perf emits it.
    const STDERR: &str = "\
frame= 1432 fps=211 q=2.0 size=  49920KiB
video:49887KiB audio:0KiB subtitle:0KiB other streams:0KiB
12345,,context-switches,2014716321,100.00,,
17,,cpu-migrations,2014716321,100.00,,
987654,,cache-misses,1507287211,74.81,,
";

    #[test]
    fn takes_exactly_the_last_k_lines() {
        let readings = parse_summary(STDERR, 3).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].event, "context-switches");
        assert_eq!(readings[0].value, 12_345);
        assert_eq!(readings[2].event, "cache-misses");
        assert_eq!(readings[2].value, 987_654);
        assert_eq!(readings[2].captured_pct, 74.81);
    }

    #[test]
    fn fewer_events_ignore_earlier_lines() {
        let readings = parse_summary(STDERR, 1).unwrap();
        assert_eq!(readings[0].event, "cache-misses");
    }

    #[test]
    fn too_few_lines_is_fatal() {
        let err = parse_summary("only-one-line\n", 2).unwrap_err();
        assert!(err.is_perf_format());
    }

    #[test]
    fn tool_noise_in_the_window_is_fatal() {
        // Requesting 4 events pulls a non-summary line into the window.
        let err = parse_summary(STDERR, 4).unwrap_err();
        assert!(err.is_perf_format());
    }

    #[test]
    fn non_numeric_value_is_fatal() {
        let err =
            parse_summary("<not counted>,,cache-misses,0,0.00,,\n", 1)
                .unwrap_err();
        assert!(err.is_perf_format());
    }

    #[test]
    fn wrapper_joins_events() {
        let events = vec!["cache-misses".to_owned(), "branch-misses".to_owned()];
        let args = wrapper_args(&events);
        assert_eq!(args[4], "--event");
        assert_eq!(args[5], "cache-misses,branch-misses");
    }
}
