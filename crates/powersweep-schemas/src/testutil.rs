//! Shared proptest strategies for schema tests.

use proptest::collection::vec;
use proptest::prelude::*;

use crate::{EnergySample, Observation, TimeSample};

/// Strategy for generating arbitrary identifier-like axis values.
pub fn arb_axis_value() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Strategy for generating a categorical domain of 1..=6 distinct values.
pub fn arb_domain() -> impl Strategy<Value = Vec<String>> {
    vec(arb_axis_value(), 1..=6).prop_map(|mut values| {
        values.sort();
        values.dedup();
        values
    })
}

/// Strategy for generating time samples with non-negative seconds.
pub fn arb_time_sample() -> impl Strategy<Value = TimeSample> {
    (0.0..500.0f64, 0.0..500.0f64, 0.0..1000.0f64).prop_map(
        |(user, sys, elapsed)| TimeSample {
            user,
            sys,
            elapsed,
        },
    )
}

/// Strategy for generating one observation with `events` counter values.
pub fn arb_observation(events: usize) -> impl Strategy<Value = Observation> {
    (
        arb_time_sample(),
        any::<u32>(),
        any::<u32>(),
        vec(any::<u64>(), events..=events),
    )
        .prop_map(|(time, package, core, counters)| Observation {
            time,
            energy: EnergySample {
                package_uj: u64::from(package),
                core_uj: u64::from(core),
            },
            counters,
        })
}
