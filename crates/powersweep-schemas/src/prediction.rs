//! Prediction records produced by the modeling phase.
//!
//! One [`PredictionRecord`] accumulates the predicted scalar for each metric
//! of one held-out parameter tuple. The set serializes to JSON for
//! downstream consumers (plotting stays out of scope).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tool::ParameterTuple;

/// Predicted metric values for one parameter tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// The held-out sweep point, in its decoded (human-readable) form.
    pub parameters: ParameterTuple,
    /// Metric name → predicted scalar. Insertion order follows the metric
    /// layout, minus any metrics whose fit failed.
    pub metrics: IndexMap<String, f64>,
}

/// All predictions of one modeling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionSet {
    pub records: Vec<PredictionRecord>,
}

impl PredictionSet {
    /// Records one predicted value, appending a new record for tuples not
    /// seen before.
    pub fn insert(&mut self, tuple: &ParameterTuple, metric: &str, value: f64) {
        match self.records.iter_mut().find(|r| &r.parameters == tuple) {
            Some(record) => {
                record.metrics.insert(metric.to_owned(), value);
            }
            None => {
                let mut metrics = IndexMap::new();
                metrics.insert(metric.to_owned(), value);
                self.records.push(PredictionRecord {
                    parameters: tuple.clone(),
                    metrics,
                });
            }
        }
    }

    /// Looks up the record for a tuple.
    pub fn get(&self, tuple: &ParameterTuple) -> Option<&PredictionRecord> {
        self.records.iter().find(|r| &r.parameters == tuple)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_groups_by_tuple() {
        let mut set = PredictionSet::default();
        let a = ParameterTuple::new(["fast", "2"]);
        let b = ParameterTuple::new(["slow", "2"]);
        set.insert(&a, "elapsed", 1.5);
        set.insert(&a, "package", 4000.0);
        set.insert(&b, "elapsed", 3.0);

        assert_eq!(set.len(), 2);
        let rec = set.get(&a).unwrap();
        assert_eq!(rec.metrics["elapsed"], 1.5);
        assert_eq!(rec.metrics["package"], 4000.0);
    }

    #[test]
    fn json_round_trip() {
        let mut set = PredictionSet::default();
        set.insert(&ParameterTuple::new(["b"]), "elapsed", 2.0);
        let json = serde_json::to_string(&set).unwrap();
        let back: PredictionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
