//! Declarative tool descriptions and parameter tuples.
//!
//! A benchmarked tool is described entirely by data: the command template,
//! the ordered parameter axes with their finite value domains, the requested
//! perf events, and the feature-vector encoding mode. The sweep driver,
//! sampler, and metric space all operate generically over this description.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::observation::MetricLayout;

/// One point in a tool's configuration sweep.
///
/// An ordered sequence of axis values, one per declared axis, in axis
/// declaration order. Immutable once constructed; acts as the key into the
/// result store. Numeric axis values are held in canonical formatted form
/// (see [`format_numeric`]) so tuple identity is stable across encode,
/// decode, and serialization round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTuple(Vec<String>);

impl ParameterTuple {
    /// Creates a tuple from raw axis values.
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Returns the axis values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of axis values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the tuple has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ParameterTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.iter().join(","))
    }
}

/// One parameter axis: a name and a finite ordered value domain.
///
/// Categorical axes hold opaque strings (encoder presets, cipher names);
/// numeric axes hold numbers that keep their magnitude when encoded.
/// Domains are declared once at configuration time and must not change
/// during a sweep; changing them invalidates all stored encodings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Axis {
    /// Discrete string-valued axis, encoded by domain index.
    Categorical {
        /// Axis name, referenced by `{name}` placeholders in the command.
        name: String,
        /// The declared value domain, in sweep order.
        values: Vec<String>,
    },
    /// Number-valued axis, encoded by its numeric value.
    Numeric {
        name: String,
        values: Vec<f64>,
    },
}

impl Axis {
    /// Returns the axis name.
    pub fn name(&self) -> &str {
        match self {
            Axis::Categorical { name, .. } | Axis::Numeric { name, .. } => name,
        }
    }

    /// Returns the number of declared domain values.
    pub fn domain_len(&self) -> usize {
        match self {
            Axis::Categorical { values, .. } => values.len(),
            Axis::Numeric { values, .. } => values.len(),
        }
    }

    /// Returns the domain value at `index` in canonical string form.
    pub fn value_at(&self, index: usize) -> Option<String> {
        match self {
            Axis::Categorical { values, .. } => values.get(index).cloned(),
            Axis::Numeric { values, .. } => {
                values.get(index).map(|v| format_numeric(*v))
            }
        }
    }

    /// Returns the full domain in canonical string form, in sweep order.
    pub fn domain(&self) -> Vec<String> {
        match self {
            Axis::Categorical { values, .. } => values.clone(),
            Axis::Numeric { values, .. } => {
                values.iter().map(|v| format_numeric(*v)).collect()
            }
        }
    }
}

/// Canonical string form of a numeric axis value.
///
/// Integral values print without a fractional part (`5`, not `5.0`) so the
/// formatted value matches what appears in command lines and persisted keys.
/// Non-integral values use `f64`'s shortest round-trip formatting.
pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Feature-vector encoding mode, fixed per tool for the lifetime of a run.
///
/// Mixing encodings for the same result store is invalid; the mode is part
/// of the tool description so every phase agrees on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// Categorical values become their domain index; numeric values pass
    /// through unchanged. One feature per axis.
    Ordinal,
    /// Categorical axes expand into a domain-sized indicator block; numeric
    /// axes stay scalar.
    OneHot,
}

fn default_repetitions() -> u32 {
    5
}

/// Declarative description of one benchmarked tool.
///
/// Loaded from a JSON file. The command template is a full argv whose
/// elements may contain `{axis}` placeholders, substituted per sweep point:
///
/// ```json
/// {
///   "name": "ffmpeg",
///   "command": ["ffmpeg", "-y", "-r", "{fps}", "-i", "in_%06d.pbm",
///               "-q:v", "{quality}", "out.mp4"],
///   "axes": [
///     {"kind": "numeric", "name": "fps", "values": [6, 12, 24]},
///     {"kind": "numeric", "name": "quality", "values": [2, 5, 10]}
///   ],
///   "events": ["context-switches", "cache-misses"],
///   "encoding": "ordinal"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, used for output file naming.
    pub name: String,
    /// Command template argv with `{axis}` placeholders.
    pub command: Vec<String>,
    /// Parameter axes in declaration order.
    pub axes: Vec<Axis>,
    /// Hardware perf events to request, in `perf stat --event` order.
    pub events: Vec<String>,
    /// Feature-vector encoding mode for the modeling phase.
    pub encoding: Encoding,
    /// Repetitions per sweep point.
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
}

impl ToolSpec {
    /// Loads and validates a tool description from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads and validates a tool description from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, SchemaError> {
        let spec: ToolSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the structural rules every description must satisfy.
    ///
    /// Runs once at load time so later phases can assume a well-formed
    /// description: non-empty name/command/axes, non-empty domains, unique
    /// axis names, at least one repetition, and every command placeholder
    /// naming a declared axis.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::validation("tool name is empty"));
        }
        if self.command.is_empty() {
            return Err(SchemaError::validation("command template is empty"));
        }
        if self.axes.is_empty() {
            return Err(SchemaError::validation("no parameter axes declared"));
        }
        if self.repetitions == 0 {
            return Err(SchemaError::validation("repetitions must be at least 1"));
        }
        if self.events.is_empty() {
            return Err(SchemaError::validation("no perf events requested"));
        }
        for axis in &self.axes {
            if axis.domain_len() == 0 {
                return Err(SchemaError::validation(format!(
                    "axis `{}` has an empty domain",
                    axis.name()
                )));
            }
        }
        if !self.axes.iter().map(Axis::name).all_unique() {
            return Err(SchemaError::validation("duplicate axis names"));
        }
        for arg in &self.command {
            for placeholder in placeholders(arg) {
                if !self.axes.iter().any(|a| a.name() == placeholder) {
                    return Err(SchemaError::validation(format!(
                        "command references unknown axis `{{{placeholder}}}`"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Renders the command argv for one sweep point by substituting each
    /// `{axis}` placeholder with the tuple's value for that axis.
    ///
    /// The tuple must have one value per declared axis, in axis order.
    pub fn render_command(&self, tuple: &ParameterTuple) -> Vec<String> {
        debug_assert_eq!(tuple.len(), self.axes.len());
        self.command
            .iter()
            .map(|arg| {
                let mut rendered = arg.clone();
                for (axis, value) in self.axes.iter().zip(tuple.values()) {
                    rendered =
                        rendered.replace(&format!("{{{}}}", axis.name()), value);
                }
                rendered
            })
            .collect()
    }

    /// Enumerates the full cartesian product of axis domains, in sweep
    /// order (last axis varies fastest).
    pub fn sweep_points(&self) -> Vec<ParameterTuple> {
        self.axes
            .iter()
            .map(Axis::domain)
            .multi_cartesian_product()
            .map(ParameterTuple::new)
            .collect()
    }

    /// Returns the metric layout implied by this description's event list.
    pub fn layout(&self) -> MetricLayout {
        MetricLayout::new(self.events.clone())
    }
}

/// Yields the `{placeholder}` names contained in one template argument.
fn placeholders(arg: &str) -> impl Iterator<Item = &str> {
    arg.match_indices('{').filter_map(|(start, _)| {
        let rest = &arg[start + 1..];
        rest.find('}').map(|end| &rest[..end])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_axis_spec() -> ToolSpec {
        ToolSpec {
            name: "demo".into(),
            command: vec![
                "demo".into(),
                "--preset".into(),
                "{preset}".into(),
                "--quality={quality}".into(),
            ],
            axes: vec![
                Axis::Categorical {
                    name: "preset".into(),
                    values: vec!["fast".into(), "slow".into()],
                },
                Axis::Numeric {
                    name: "quality".into(),
                    values: vec![2.0, 5.0, 10.0],
                },
            ],
            events: vec!["cache-misses".into()],
            encoding: Encoding::Ordinal,
            repetitions: 3,
        }
    }

    #[test]
    fn sweep_points_cover_cartesian_product() {
        let spec = two_axis_spec();
        let points = spec.sweep_points();
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], ParameterTuple::new(["fast", "2"]));
        assert_eq!(points[5], ParameterTuple::new(["slow", "10"]));
    }

    #[test]
    fn render_substitutes_placeholders() {
        let spec = two_axis_spec();
        let tuple = ParameterTuple::new(["slow", "5"]);
        let argv = spec.render_command(&tuple);
        assert_eq!(argv, ["demo", "--preset", "slow", "--quality=5"]);
    }

    #[test]
    fn validate_rejects_unknown_placeholder() {
        let mut spec = two_axis_spec();
        spec.command.push("{missing}".into());
        let err = spec.validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn validate_rejects_empty_domain() {
        let mut spec = two_axis_spec();
        spec.axes.push(Axis::Categorical {
            name: "empty".into(),
            values: vec![],
        });
        assert!(spec.validate().unwrap_err().is_validation());
    }

    #[test]
    fn validate_rejects_duplicate_axis_names() {
        let mut spec = two_axis_spec();
        spec.axes.push(Axis::Numeric {
            name: "preset".into(),
            values: vec![1.0],
        });
        assert!(spec.validate().unwrap_err().is_validation());
    }

    #[test]
    fn numeric_formatting_is_canonical() {
        assert_eq!(format_numeric(5.0), "5");
        assert_eq!(format_numeric(-3.0), "-3");
        assert_eq!(format_numeric(2.5), "2.5");
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = two_axis_spec();
        let json = serde_json::to_string(&spec).unwrap();
        let back = ToolSpec::from_reader(json.as_bytes()).unwrap();
        assert_eq!(back.name, spec.name);
        assert_eq!(back.encoding, spec.encoding);
        assert_eq!(back.sweep_points(), spec.sweep_points());
    }
}
