//! Per-metric model training and held-out prediction.
//!
//! The regression engine is invoked once per output metric: feature
//! vectors are identical across metrics, only the target scalar changes,
//! and each metric may relate to the feature space differently. Every
//! metric gets a fresh accumulator so that training rows for one target
//! never leak into another metric's fit, and a singular or underdetermined
//! system fails that metric alone while the others continue.

use indexmap::IndexMap;
use powersweep_lstsq::{FitError, LeastSquares, Model};
use powersweep_schemas::{
    Encoding, MetricLayout, Observation, ParameterTuple, PredictionSet,
};
use powersweep_space::MetricSpace;
use tracing::{debug, warn};

use crate::error::ModelError;

/// The per-metric outcome of one training run: a usable model or the
/// fit error that disqualified the metric.
#[derive(Debug)]
pub struct MetricModels {
    fitted: IndexMap<String, Model>,
    failed: IndexMap<String, FitError>,
}

impl MetricModels {
    /// The usable model for a metric, if its fit succeeded.
    pub fn model(&self, metric: &str) -> Option<&Model> {
        self.fitted.get(metric)
    }

    /// Successfully fitted models, in metric layout order.
    pub fn fitted(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.fitted.iter().map(|(name, model)| (name.as_str(), model))
    }

    /// Metrics whose fit failed, with the reason.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &FitError)> {
        self.failed.iter().map(|(name, err)| (name.as_str(), err))
    }

    pub fn fitted_count(&self) -> usize {
        self.fitted.len()
    }
}

/// Fits one least-squares model per metric from the training side.
///
/// Tuples are encoded once and reused across metrics. Returns an error
/// only for whole-run failures (an unencodable tuple); per-metric fit
/// failures are collected in the result and logged as warnings.
pub fn fit_all(
    space: &MetricSpace<'_>,
    encoding: Encoding,
    layout: &MetricLayout,
    training: &IndexMap<ParameterTuple, Vec<Observation>>,
) -> Result<MetricModels, ModelError> {
    let width = space.width(encoding);
    let encoded: Vec<(Vec<f64>, &[Observation])> = training
        .iter()
        .map(|(tuple, records)| {
            Ok((space.encode(tuple, encoding)?, records.as_slice()))
        })
        .collect::<Result<_, ModelError>>()?;

    let mut models = MetricModels {
        fitted: IndexMap::new(),
        failed: IndexMap::new(),
    };
    for metric in layout.metric_names() {
        let mut solver = LeastSquares::new(width);
        for (features, records) in &encoded {
            for record in *records {
                let target = record
                    .metric(layout, metric)
                    .expect("layout names its own metrics");
                solver.add(features, target);
            }
        }
        match solver.solve() {
            Ok(model) => {
                debug!(metric, coefficients = ?model.coefficients(), "fitted");
                models.fitted.insert(metric.to_owned(), model);
            }
            Err(err) => {
                warn!(metric, %err, "fit failed; skipping this metric");
                models.failed.insert(metric.to_owned(), err);
            }
        }
    }
    Ok(models)
}

/// Predicts every fitted metric for every held-out tuple.
pub fn predict_all(
    space: &MetricSpace<'_>,
    encoding: Encoding,
    models: &MetricModels,
    control: &IndexMap<ParameterTuple, Vec<Observation>>,
) -> Result<PredictionSet, ModelError> {
    let mut predictions = PredictionSet::default();
    for tuple in control.keys() {
        let features = space.encode(tuple, encoding)?;
        for (metric, model) in models.fitted() {
            predictions.insert(tuple, metric, model.predict(&features));
        }
    }
    Ok(predictions)
}
