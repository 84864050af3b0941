//! Prediction-versus-measurement reporting.
//!
//! For each metric, compares the model's prediction for every held-out
//! tuple against the observed corridor: the min/max of that tuple's
//! measured repetitions in the full result store. A prediction inside the
//! corridor is consistent with the measurement spread; one outside it
//! quantifies how far the linear model misses.

use std::io::Write;

use powersweep_schemas::{MetricLayout, Observation, PredictionSet};
use powersweep_store::ResultStore;

/// Observed value range of one metric across a tuple's repetitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    pub min: f64,
    pub max: f64,
}

impl Corridor {
    /// True if `value` lies within the closed range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Computes the observed corridor of `metric` over a tuple's repetitions.
///
/// Returns `None` for an empty repetition list or a metric outside the
/// layout.
pub fn corridor(
    records: &[Observation],
    layout: &MetricLayout,
    metric: &str,
) -> Option<Corridor> {
    let mut values = records.iter().filter_map(|r| r.metric(layout, metric));
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(min, max), v| {
        (min.min(v), max.max(v))
    });
    Some(Corridor { min, max })
}

/// Writes the per-metric comparison tables.
///
/// One section per metric in layout order, one row per predicted tuple,
/// with the prediction, the observed corridor, and an `ok`/`out` marker.
/// Tuples absent from the store (nothing measured) are skipped. Ends with
/// a summary line counting in-corridor predictions.
pub fn write_report(
    store: &ResultStore,
    predictions: &PredictionSet,
    layout: &MetricLayout,
    mut w: impl Write,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Predictions vs observed corridors ({} held-out points)",
        predictions.len()
    )?;

    let mut total = 0usize;
    let mut within = 0usize;
    for metric in layout.metric_names() {
        let rows: Vec<_> = predictions
            .records
            .iter()
            .filter_map(|record| {
                let predicted = *record.metrics.get(metric)?;
                let measured = store.get(&record.parameters)?;
                let range = corridor(measured, layout, metric)?;
                Some((record.parameters.to_string(), predicted, range))
            })
            .collect();
        if rows.is_empty() {
            continue;
        }

        writeln!(w)?;
        writeln!(w, "== {metric} ==")?;
        writeln!(
            w,
            "{:<28} {:>14} {:>14} {:>14}",
            "parameters", "predicted", "observed min", "observed max"
        )?;
        for (parameters, predicted, range) in rows {
            let marker = if range.contains(predicted) {
                within += 1;
                "ok"
            } else {
                "out"
            };
            total += 1;
            writeln!(
                w,
                "{parameters:<28} {predicted:>14.3} {:>14.3} {:>14.3}  {marker}",
                range.min, range.max
            )?;
        }
    }

    writeln!(w)?;
    writeln!(w, "Within corridor: {within}/{total}")?;
    Ok(())
}
