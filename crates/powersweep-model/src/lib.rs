//! Modeling phase: split, train, predict.
//!
//! Consumes a finished [`ResultStore`](powersweep_store::ResultStore) and
//! produces a [`PredictionSet`](powersweep_schemas::PredictionSet):
//!
//! ```text
//! ResultStore -> split() -> SplitSets -> fit_all() -> MetricModels
//!                                          -> predict_all() -> PredictionSet
//! ```
//!
//! The split is re-derived from the store on every modeling run; neither
//! side is persisted. Models are trained per metric over homogeneous
//! feature vectors and queried only for held-out tuples.

mod error;
mod split;
mod train;

pub use error::ModelError;
pub use split::{SplitSets, split};
pub use train::{MetricModels, fit_all, predict_all};
