//! In-memory result accumulation and the persisted text format.
//!
//! The [`ResultStore`] maps each parameter tuple to the ordered list of
//! its per-repetition observations. Created empty at benchmark start,
//! appended to by the sampler, immutable after the sweep apart from
//! serialization round-trips that reconstruct it exactly.
//!
//! ## Persisted format
//!
//! One line per parameter tuple, `#` between fields, commas within:
//!
//! ```text
//! 0,2#1.25,0.03,2.41,48213,11974,12345,17#1.31,0.02,2.44,47930,11870,12388,19
//! ```
//!
//! The first field is the comma-joined ordinal encoding of the tuple; each
//! remaining field is one repetition's values in the fixed order
//! {user, sys, elapsed}, {package, core}, {counter_1..counter_k}. Field
//! counts match the metric layout exactly, so import reconstructs records
//! positionally with no embedded names. Time values round-trip through
//! `f64`'s shortest-exact formatting; energy and counter values are
//! integers.

mod error;

pub use error::StoreError;

use std::io::{BufRead, Write};

use indexmap::IndexMap;
use itertools::Itertools;
use powersweep_schemas::{
    ENERGY_METRICS, Encoding, EnergySample, MetricLayout, Observation,
    ParameterTuple, TIME_METRICS, TimeSample, format_numeric,
};
use powersweep_space::MetricSpace;

/// Delimiter between the key field and per-repetition fields.
const FIELD_DELIMITER: char = '#';

/// All measurements of one sweep, keyed by parameter tuple.
///
/// Insertion order is preserved for traceability; it carries no semantic
/// weight beyond matching the sweep's execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    entries: IndexMap<ParameterTuple, Vec<Observation>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one repetition's record to a tuple's entry, creating the
    /// entry on first use.
    pub fn append(&mut self, tuple: &ParameterTuple, record: Observation) {
        self.entries
            .entry(tuple.clone())
            .or_default()
            .push(record);
    }

    /// Returns the repetitions recorded for a tuple.
    pub fn get(&self, tuple: &ParameterTuple) -> Option<&[Observation]> {
        self.entries.get(tuple).map(Vec::as_slice)
    }

    /// Iterates entries in insertion order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&ParameterTuple, &[Observation])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of distinct parameter tuples.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total repetitions across all tuples.
    pub fn repetition_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Writes the store in the persisted text format.
    ///
    /// Keys use the ordinal encoding regardless of the tool's modeling
    /// encoding; the on-disk key space is fixed so files stay comparable
    /// across modeling runs.
    pub fn write_to(
        &self,
        space: &MetricSpace<'_>,
        writer: &mut impl Write,
    ) -> Result<(), StoreError> {
        for (tuple, records) in &self.entries {
            let key = space
                .encode(tuple, Encoding::Ordinal)?
                .iter()
                .map(|v| format_numeric(*v))
                .join(",");
            write!(writer, "{key}")?;
            for record in records {
                write!(writer, "{FIELD_DELIMITER}{}", record_field(record))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Reconstructs a store from the persisted text format.
    ///
    /// The metric space and layout must match the ones the file was
    /// written under; a mismatch surfaces as a format or encoding error,
    /// never as silently misaligned metrics.
    pub fn read_from(
        space: &MetricSpace<'_>,
        layout: &MetricLayout,
        reader: impl BufRead,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let number = index + 1;

            let mut fields = line.split(FIELD_DELIMITER);
            let key = fields
                .next()
                .ok_or_else(|| StoreError::format(number, "empty record"))?;
            let vector = key
                .split(',')
                .map(|v| {
                    v.parse::<f64>().map_err(|_| {
                        StoreError::format(number, format!("bad key value `{v}`"))
                    })
                })
                .collect::<Result<Vec<f64>, StoreError>>()?;
            let tuple = space.decode(&vector, Encoding::Ordinal)?;

            let mut records = Vec::new();
            for field in fields {
                records.push(parse_record_field(field, layout, number)?);
            }
            if records.is_empty() {
                return Err(StoreError::format(number, "no repetitions"));
            }
            for record in records {
                store.append(&tuple, record);
            }
        }
        Ok(store)
    }
}

/// One repetition as a comma-joined value group in layout order.
fn record_field(record: &Observation) -> String {
    let mut values = vec![
        record.time.user.to_string(),
        record.time.sys.to_string(),
        record.time.elapsed.to_string(),
        record.energy.package_uj.to_string(),
        record.energy.core_uj.to_string(),
    ];
    values.extend(record.counters.iter().map(u64::to_string));
    values.join(",")
}

fn parse_record_field(
    field: &str,
    layout: &MetricLayout,
    line: usize,
) -> Result<Observation, StoreError> {
    let values: Vec<&str> = field.split(',').collect();
    if values.len() != layout.len() {
        return Err(StoreError::format(
            line,
            format!(
                "repetition has {} values, layout declares {}",
                values.len(),
                layout.len()
            ),
        ));
    }

    let float = |v: &str| {
        v.parse::<f64>().map_err(|_| {
            StoreError::format(line, format!("bad time value `{v}`"))
        })
    };
    let int = |v: &str| {
        v.parse::<u64>().map_err(|_| {
            StoreError::format(line, format!("bad counter value `{v}`"))
        })
    };

    let time = TimeSample {
        user: float(values[0])?,
        sys: float(values[1])?,
        elapsed: float(values[2])?,
    };
    let energy = EnergySample {
        package_uj: int(values[TIME_METRICS.len()])?,
        core_uj: int(values[TIME_METRICS.len() + 1])?,
    };
    let counters = values[TIME_METRICS.len() + ENERGY_METRICS.len()..]
        .iter()
        .map(|v| int(v))
        .collect::<Result<Vec<u64>, StoreError>>()?;

    Ok(Observation {
        time,
        energy,
        counters,
    })
}

#[cfg(test)]
mod tests {
    use powersweep_schemas::Axis;
    use powersweep_schemas::testutil::arb_observation;
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    fn axes() -> Vec<Axis> {
        vec![
            Axis::Categorical {
                name: "preset".into(),
                values: vec!["fast".into(), "slow".into()],
            },
            Axis::Numeric {
                name: "quality".into(),
                values: vec![2.0, 5.0],
            },
        ]
    }

    fn layout() -> MetricLayout {
        MetricLayout::new(vec!["context-switches".into(), "cache-misses".into()])
    }

    fn observation(elapsed: f64, counters: [u64; 2]) -> Observation {
        Observation {
            time: TimeSample {
                user: elapsed * 0.8,
                sys: 0.03,
                elapsed,
            },
            energy: EnergySample {
                package_uj: 48_213,
                core_uj: 11_974,
            },
            counters: counters.to_vec(),
        }
    }

    #[test]
    fn round_trips_multi_repetition_entries() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let mut store = ResultStore::new();
        let a = ParameterTuple::new(["fast", "2"]);
        let b = ParameterTuple::new(["slow", "5"]);
        store.append(&a, observation(1.25, [12_345, 17]));
        store.append(&a, observation(1.31, [12_388, 19]));
        store.append(&b, observation(2.44, [99_000, 3]));

        let mut buffer = Vec::new();
        store.write_to(&space, &mut buffer).unwrap();
        let back =
            ResultStore::read_from(&space, &layout(), buffer.as_slice()).unwrap();
        assert_eq!(back, store);
        assert_eq!(back.get(&a).unwrap().len(), 2);
    }

    #[test]
    fn keys_are_ordinal_encoded() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let mut store = ResultStore::new();
        store.append(
            &ParameterTuple::new(["slow", "5"]),
            observation(1.0, [1, 2]),
        );

        let mut buffer = Vec::new();
        store.write_to(&space, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("1,5#"), "got: {text}");
    }

    #[test]
    fn wrong_value_count_is_a_format_error() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let err =
            ResultStore::read_from(&space, &layout(), "0,2#1.0,2.0\n".as_bytes())
                .unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn bad_key_is_a_format_error() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let line = "zero,2#1.0,0.1,1.2,10,20,1,2\n";
        let err = ResultStore::read_from(&space, &layout(), line.as_bytes())
            .unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn entry_without_repetitions_is_a_format_error() {
        let axes = axes();
        let space = MetricSpace::new(&axes);
        let err = ResultStore::read_from(&space, &layout(), "0,2\n".as_bytes())
            .unwrap_err();
        assert!(err.is_format());
    }

    proptest! {
        #[test]
        fn round_trips_arbitrary_observations(
            reps in vec(arb_observation(2), 1..5),
        ) {
            let axes = axes();
            let space = MetricSpace::new(&axes);
            let mut store = ResultStore::new();
            let tuple = ParameterTuple::new(["fast", "5"]);
            for rep in reps {
                store.append(&tuple, rep);
            }

            let mut buffer = Vec::new();
            store.write_to(&space, &mut buffer).unwrap();
            let back = ResultStore::read_from(
                &space,
                &layout(),
                buffer.as_slice(),
            ).unwrap();
            prop_assert_eq!(back, store);
        }
    }
}
