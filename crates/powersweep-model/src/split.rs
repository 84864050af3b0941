//! Training/control partitioning of a result store.
//!
//! Each individual repetition (not each parameter tuple) is assigned to
//! one side by an independent uniform draw in [1, 100] against the target
//! training percentage. The same tuple can therefore appear on both sides
//! with different repetitions, and a tuple with few repetitions may land
//! entirely on one side; both are accepted. There is no fixed seed:
//! re-running the split on the same store yields a different partition.

use indexmap::IndexMap;
use powersweep_schemas::{Observation, ParameterTuple};
use powersweep_store::ResultStore;
use rand::Rng;

use crate::error::{ModelError, ModelErrorKind};

/// The two sides of one partition, derived from a store and discarded
/// after modeling; never persisted.
#[derive(Debug, Clone, Default)]
pub struct SplitSets {
    pub training: IndexMap<ParameterTuple, Vec<Observation>>,
    pub control: IndexMap<ParameterTuple, Vec<Observation>>,
}

impl SplitSets {
    /// Total repetitions on the training side.
    pub fn training_count(&self) -> usize {
        self.training.values().map(Vec::len).sum()
    }

    /// Total repetitions on the control side.
    pub fn control_count(&self) -> usize {
        self.control.values().map(Vec::len).sum()
    }
}

/// Partitions every repetition of `store` by Bernoulli assignment.
///
/// `training_percentage` must be within [1, 100]; 100 sends every
/// repetition to the training side.
pub fn split(
    store: &ResultStore,
    training_percentage: u32,
    rng: &mut impl Rng,
) -> Result<SplitSets, ModelError> {
    if !(1..=100).contains(&training_percentage) {
        return Err(ModelError::new(ModelErrorKind::Percentage(
            training_percentage,
        )));
    }

    let mut sets = SplitSets::default();
    for (tuple, records) in store.iter() {
        for record in records {
            let side = if rng.random_range(1..=100u32) <= training_percentage {
                &mut sets.training
            } else {
                &mut sets.control
            };
            side.entry(tuple.clone()).or_default().push(record.clone());
        }
    }
    Ok(sets)
}
