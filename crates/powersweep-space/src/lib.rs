//! Bidirectional mapping between parameter tuples and feature vectors.
//!
//! The regression engine consumes real-valued vectors, so every parameter
//! tuple is encoded deterministically in one of two modes:
//!
//! - **Ordinal**: each categorical value becomes its index within the
//!   axis's declared domain; numeric values pass through unchanged. One
//!   feature per axis.
//! - **One-hot**: each categorical axis expands into a domain-sized
//!   indicator block with a single 1.0; numeric axes stay scalar.
//!
//! Decoding is the exact left inverse of encoding for in-domain tuples.
//! In one-hot mode, decode rejects blocks without exactly one active
//! indicator, the signature of a corrupted or mismatched vector.
//!
//! The encoding mode is fixed per tool for the lifetime of a run; axis
//! domains must not change once measurements exist, since stored encodings
//! are positional against the declared domains.

mod error;

pub use error::SpaceError;

use error::SpaceErrorKind;
use powersweep_schemas::{Axis, Encoding, ParameterTuple, format_numeric};

/// The encoding space defined by one tool's parameter axes.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpace<'a> {
    axes: &'a [Axis],
}

impl<'a> MetricSpace<'a> {
    pub fn new(axes: &'a [Axis]) -> Self {
        Self { axes }
    }

    /// The ordered parameter axes.
    pub fn axes(&self) -> &[Axis] {
        self.axes
    }

    /// Feature-vector length for a mode (without the regression bias term).
    pub fn width(&self, mode: Encoding) -> usize {
        match mode {
            Encoding::Ordinal => self.axes.len(),
            Encoding::OneHot => self
                .axes
                .iter()
                .map(|axis| match axis {
                    Axis::Categorical { values, .. } => values.len(),
                    Axis::Numeric { .. } => 1,
                })
                .sum(),
        }
    }

    /// Encodes a parameter tuple into a feature vector.
    ///
    /// Fails with a domain error if a value is absent from its axis's
    /// declared domain and cannot be interpreted numerically (ordinal
    /// numeric pass-through; one-hot categorical axes accept in-domain
    /// values only, since an out-of-domain value has no indicator).
    pub fn encode(
        &self,
        tuple: &ParameterTuple,
        mode: Encoding,
    ) -> Result<Vec<f64>, SpaceError> {
        if tuple.len() != self.axes.len() {
            return Err(SpaceError::new(SpaceErrorKind::Arity {
                expected: self.axes.len(),
                got: tuple.len(),
            }));
        }

        let mut vector = Vec::with_capacity(self.width(mode));
        for (axis, value) in self.axes.iter().zip(tuple.values()) {
            match (axis, mode) {
                (Axis::Categorical { values, .. }, Encoding::Ordinal) => {
                    match values.iter().position(|v| v == value) {
                        Some(index) => vector.push(index as f64),
                        None => vector.push(parse_raw(axis, value)?),
                    }
                }
                (Axis::Categorical { values, .. }, Encoding::OneHot) => {
                    let index = values
                        .iter()
                        .position(|v| v == value)
                        .ok_or_else(|| domain_error(axis, value))?;
                    vector.extend(
                        (0..values.len())
                            .map(|i| if i == index { 1.0 } else { 0.0 }),
                    );
                }
                (Axis::Numeric { .. }, _) => {
                    vector.push(parse_raw(axis, value)?);
                }
            }
        }
        Ok(vector)
    }

    /// Decodes a feature vector back into a parameter tuple.
    ///
    /// The exact left inverse of [`encode`](Self::encode) for tuples within
    /// declared domains. In one-hot mode, a categorical block with zero or
    /// more than one active indicator fails with an invalid-encoding error.
    pub fn decode(
        &self,
        vector: &[f64],
        mode: Encoding,
    ) -> Result<ParameterTuple, SpaceError> {
        let expected = self.width(mode);
        if vector.len() != expected {
            return Err(SpaceError::new(SpaceErrorKind::Arity {
                expected,
                got: vector.len(),
            }));
        }

        let mut values = Vec::with_capacity(self.axes.len());
        let mut cursor = 0usize;
        for axis in self.axes {
            match (axis, mode) {
                (Axis::Categorical { values: domain, .. }, Encoding::Ordinal) => {
                    values.push(ordinal_categorical(domain, vector[cursor]));
                    cursor += 1;
                }
                (Axis::Categorical { values: domain, .. }, Encoding::OneHot) => {
                    let block = &vector[cursor..cursor + domain.len()];
                    let active: Vec<usize> = block
                        .iter()
                        .enumerate()
                        .filter(|&(_, &x)| x != 0.0)
                        .map(|(i, _)| i)
                        .collect();
                    let index = match active.as_slice() {
                        &[index] => index,
                        _ => {
                            return Err(SpaceError::new(
                                SpaceErrorKind::InvalidEncoding {
                                    axis: axis.name().to_owned(),
                                    active: active.len(),
                                },
                            ));
                        }
                    };
                    values.push(domain[index].clone());
                    cursor += domain.len();
                }
                (Axis::Numeric { .. }, _) => {
                    values.push(format_numeric(vector[cursor]));
                    cursor += 1;
                }
            }
        }
        Ok(ParameterTuple::new(values))
    }
}

/// Ordinal decode of one categorical feature: an integral in-range value is
/// a domain index, anything else is a passed-through raw number.
fn ordinal_categorical(domain: &[String], feature: f64) -> String {
    if feature >= 0.0 && feature.fract() == 0.0 && (feature as usize) < domain.len()
    {
        domain[feature as usize].clone()
    } else {
        format_numeric(feature)
    }
}

fn parse_raw(axis: &Axis, value: &str) -> Result<f64, SpaceError> {
    value
        .parse::<f64>()
        .map_err(|_| domain_error(axis, value))
}

fn domain_error(axis: &Axis, value: &str) -> SpaceError {
    SpaceError::new(SpaceErrorKind::Domain {
        axis: axis.name().to_owned(),
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use powersweep_schemas::testutil::arb_domain;
    use proptest::prelude::*;

    use super::*;

    fn axes() -> Vec<Axis> {
        vec![
            Axis::Categorical {
                name: "preset".into(),
                values: vec!["ultrafast".into(), "fast".into(), "slow".into()],
            },
            Axis::Numeric {
                name: "quality".into(),
                values: vec![2.0, 5.0, 10.0],
            },
        ]
    }

    #[test]
    fn ordinal_round_trip() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let tuple = ParameterTuple::new(["fast", "5"]);
        let vector = space.encode(&tuple, Encoding::Ordinal).unwrap();
        assert_eq!(vector, [1.0, 5.0]);
        assert_eq!(space.decode(&vector, Encoding::Ordinal).unwrap(), tuple);
    }

    #[test]
    fn one_hot_round_trip() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        assert_eq!(space.width(Encoding::OneHot), 4);
        let tuple = ParameterTuple::new(["slow", "10"]);
        let vector = space.encode(&tuple, Encoding::OneHot).unwrap();
        assert_eq!(vector, [0.0, 0.0, 1.0, 10.0]);
        assert_eq!(space.decode(&vector, Encoding::OneHot).unwrap(), tuple);
    }

    #[test]
    fn ordinal_passes_numeric_values_through() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        // "7" is not a preset, but it parses as a number.
        let tuple = ParameterTuple::new(["7", "2.5"]);
        let vector = space.encode(&tuple, Encoding::Ordinal).unwrap();
        assert_eq!(vector, [7.0, 2.5]);
        assert_eq!(space.decode(&vector, Encoding::Ordinal).unwrap(), tuple);
    }

    #[test]
    fn unknown_value_is_a_domain_error() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let tuple = ParameterTuple::new(["medium", "5"]);
        let err = space.encode(&tuple, Encoding::Ordinal).unwrap_err();
        assert!(err.is_domain());
        let err = space.encode(&tuple, Encoding::OneHot).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn corrupted_one_hot_blocks_are_rejected() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        // Two active indicators.
        let err = space
            .decode(&[1.0, 1.0, 0.0, 5.0], Encoding::OneHot)
            .unwrap_err();
        assert!(err.is_invalid_encoding());
        // Zero active indicators.
        let err = space
            .decode(&[0.0, 0.0, 0.0, 5.0], Encoding::OneHot)
            .unwrap_err();
        assert!(err.is_invalid_encoding());
    }

    #[test]
    fn length_mismatches_are_rejected() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let err = space
            .encode(&ParameterTuple::new(["fast"]), Encoding::Ordinal)
            .unwrap_err();
        assert!(err.is_arity());
        let err = space.decode(&[1.0], Encoding::Ordinal).unwrap_err();
        assert!(err.is_arity());
    }

    proptest! {
        #[test]
        fn round_trip_over_arbitrary_domains(
            domain in arb_domain(),
            pick in any::<prop::sample::Index>(),
            quality in 0u8..100,
        ) {
            let axes = vec![
                Axis::Categorical {
                    name: "mode".into(),
                    values: domain.clone(),
                },
                Axis::Numeric {
                    name: "quality".into(),
                    values: vec![f64::from(quality)],
                },
            ];
            let space = MetricSpace::new(&axes);
            let tuple = ParameterTuple::new([
                domain[pick.index(domain.len())].clone(),
                quality.to_string(),
            ]);

            for mode in [Encoding::Ordinal, Encoding::OneHot] {
                let vector = space.encode(&tuple, mode).unwrap();
                prop_assert_eq!(vector.len(), space.width(mode));
                prop_assert_eq!(&space.decode(&vector, mode).unwrap(), &tuple);
            }
        }
    }
}
