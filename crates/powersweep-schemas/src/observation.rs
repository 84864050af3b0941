//! Observation records and the fixed metric ordering.
//!
//! Every repetition of a sweep point produces one [`Observation`] holding
//! wall/CPU times, wraparound-corrected energy deltas, and the requested
//! hardware counter values. All observations of a tool expose exactly the
//! same metric names in the same order, captured by [`MetricLayout`]; the
//! persisted result format relies on this ordering for positional
//! reconstruction.

use serde::{Deserialize, Serialize};

/// Time metric names, in record order.
pub const TIME_METRICS: [&str; 3] = ["user", "sys", "elapsed"];

/// Energy metric names, in record order.
pub const ENERGY_METRICS: [&str; 2] = ["package", "core"];

/// Wall/CPU time of one repetition, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSample {
    /// User-mode CPU seconds.
    pub user: f64,
    /// Kernel-mode CPU seconds.
    pub sys: f64,
    /// Wall-clock seconds.
    pub elapsed: f64,
}

/// Energy consumed by one repetition, in microjoules.
///
/// Values are deltas between counter snapshots taken immediately before and
/// after the subprocess, already corrected for counter wraparound, so they are
/// always non-negative and within one wraparound period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergySample {
    /// Package-level energy delta.
    pub package_uj: u64,
    /// Core-level energy delta.
    pub core_uj: u64,
}

/// The measured metrics of one repetition of one sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: TimeSample,
    pub energy: EnergySample,
    /// Hardware counter values, aligned with [`MetricLayout::events`].
    pub counters: Vec<u64>,
}

impl Observation {
    /// Looks up a metric value by name.
    ///
    /// Returns `None` for names outside the layout, including counter
    /// events the layout does not declare.
    pub fn metric(&self, layout: &MetricLayout, name: &str) -> Option<f64> {
        match name {
            "user" => Some(self.time.user),
            "sys" => Some(self.time.sys),
            "elapsed" => Some(self.time.elapsed),
            "package" => Some(self.energy.package_uj as f64),
            "core" => Some(self.energy.core_uj as f64),
            _ => {
                let idx = layout.events.iter().position(|e| e == name)?;
                self.counters.get(idx).map(|&v| v as f64)
            }
        }
    }
}

/// The fixed ordering of metric names for one tool.
///
/// Record order is {time metrics}, {energy metrics}, {counter events}; the
/// event list comes from the tool description. Field counts in the persisted
/// format match this layout exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricLayout {
    /// Hardware perf event names, in requested order.
    pub events: Vec<String>,
}

impl MetricLayout {
    pub fn new(events: Vec<String>) -> Self {
        Self { events }
    }

    /// Yields every metric name in record order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        TIME_METRICS
            .iter()
            .chain(ENERGY_METRICS.iter())
            .copied()
            .chain(self.events.iter().map(String::as_str))
    }

    /// Total number of metrics per observation.
    pub fn len(&self) -> usize {
        TIME_METRICS.len() + ENERGY_METRICS.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        Observation {
            time: TimeSample {
                user: 1.25,
                sys: 0.5,
                elapsed: 2.0,
            },
            energy: EnergySample {
                package_uj: 4200,
                core_uj: 1300,
            },
            counters: vec![17, 99],
        }
    }

    #[test]
    fn metric_names_follow_record_order() {
        let layout =
            MetricLayout::new(vec!["cache-misses".into(), "branch-misses".into()]);
        let names: Vec<&str> = layout.metric_names().collect();
        assert_eq!(
            names,
            [
                "user",
                "sys",
                "elapsed",
                "package",
                "core",
                "cache-misses",
                "branch-misses"
            ]
        );
        assert_eq!(layout.len(), 7);
    }

    #[test]
    fn metric_lookup_covers_all_names() {
        let layout =
            MetricLayout::new(vec!["cache-misses".into(), "branch-misses".into()]);
        let obs = sample();
        assert_eq!(obs.metric(&layout, "user"), Some(1.25));
        assert_eq!(obs.metric(&layout, "elapsed"), Some(2.0));
        assert_eq!(obs.metric(&layout, "package"), Some(4200.0));
        assert_eq!(obs.metric(&layout, "cache-misses"), Some(17.0));
        assert_eq!(obs.metric(&layout, "branch-misses"), Some(99.0));
        assert_eq!(obs.metric(&layout, "instructions"), None);
    }
}
