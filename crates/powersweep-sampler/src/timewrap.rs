//! The wall/CPU-time wrapper and its fixed-format side channel.
//!
//! `/usr/bin/time -f %U,%S,%e -o <file>` writes one line of
//! `user,sys,elapsed` decimal seconds to a designated transient file,
//! overwritten per repetition. The wrapper sits between the profiler
//! prefix and the benchmarked command so the profiler accounts for the
//! whole child tree while the time file stays unmixed with tool output.

use std::path::Path;

use powersweep_schemas::TimeSample;

use crate::error::SamplerError;

/// Absolute path of the time wrapper; the shell builtin lacks `-f`/`-o`.
pub const TIME_BINARY: &str = "/usr/bin/time";

/// Output format: user, sys, elapsed seconds, comma separated.
pub const TIME_FORMAT: &str = "%U,%S,%e";

/// Builds the wrapper prefix writing its side channel to `output`.
pub fn wrapper_args(output: &Path) -> Vec<String> {
    vec![
        TIME_BINARY.to_owned(),
        "-f".to_owned(),
        TIME_FORMAT.to_owned(),
        "-o".to_owned(),
        output.display().to_string(),
    ]
}

/// Parses the side-channel file contents into seconds.
///
/// Exactly three comma-separated decimal fields on the first line; anything
/// else is a malformed side channel and fatal for the sweep.
pub fn parse_output(content: &str) -> Result<TimeSample, SamplerError> {
    let line = content
        .lines()
        .next()
        .ok_or_else(|| SamplerError::time_format(content))?;

    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != 3 {
        return Err(SamplerError::time_format(line));
    }

    let parse = |field: &str| {
        field
            .parse::<f64>()
            .map_err(|_| SamplerError::time_format(line))
    };
    Ok(TimeSample {
        user: parse(fields[0])?,
        sys: parse(fields[1])?,
        elapsed: parse(fields[2])?,
    })
}
