//! Shared data model for the powersweep benchmark harness.
//!
//! This crate defines the types that flow between the pipeline phases:
//!
//! - [`ToolSpec`]: a declarative description of one benchmarked tool
//!   (command template, parameter axes, perf events, encoding mode).
//!   Tools are data, not code: the sampler and metric space operate
//!   generically over the description.
//! - [`ParameterTuple`]: one point in a tool's configuration sweep.
//! - [`Observation`]: the measured metrics of one repetition.
//! - [`MetricLayout`]: the fixed ordering of metric names shared by every
//!   observation of a tool, which positional serialization relies on.
//! - [`PredictionSet`]: per-tuple, per-metric model outputs.
//!
//! Living in one crate ensures all phases share the same serialization
//! contract without re-defining record shapes.

mod error;
mod observation;
mod prediction;
mod tool;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::SchemaError;
pub use observation::{EnergySample, MetricLayout, Observation, TimeSample};
pub use observation::{ENERGY_METRICS, TIME_METRICS};
pub use prediction::{PredictionRecord, PredictionSet};
pub use tool::{Axis, Encoding, ParameterTuple, ToolSpec, format_numeric};
