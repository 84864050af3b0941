//! End-to-end modeling scenario over a synthetic one-axis sweep.
//!
//! Three sweep points {a, b, c} with three repetitions each and fixed
//! elapsed times {1,1,1}, {2,2,2}, {3,3,3}; ordinal encoding; 100%
//! training split. The fitted elapsed-time model must reproduce the
//! (exactly linear) relationship and predict ~2.0 for "b".

use powersweep_model::{fit_all, predict_all, split};
use powersweep_schemas::{
    Axis, Encoding, EnergySample, MetricLayout, Observation, ParameterTuple,
    TimeSample,
};
use powersweep_space::MetricSpace;
use powersweep_store::ResultStore;

fn observation(elapsed: f64) -> Observation {
    Observation {
        time: TimeSample {
            user: elapsed * 0.9,
            sys: 0.1,
            elapsed,
        },
        energy: EnergySample {
            package_uj: (elapsed * 50_000.0) as u64,
            core_uj: (elapsed * 12_000.0) as u64,
        },
        counters: vec![],
    }
}

fn synthetic_store() -> ResultStore {
    let mut store = ResultStore::new();
    for (value, elapsed) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
        let tuple = ParameterTuple::new([value]);
        for _ in 0..3 {
            store.append(&tuple, observation(elapsed));
        }
    }
    store
}

#[test]
fn sweep_split_fit_predict() {
    let axes = vec![Axis::Categorical {
        name: "input".into(),
        values: vec!["a".into(), "b".into(), "c".into()],
    }];
    let space = MetricSpace::new(&axes);
    let layout = MetricLayout::new(vec![]);
    let store = synthetic_store();

    // Persist and re-import before modeling, as the real pipeline does.
    let mut buffer = Vec::new();
    store.write_to(&space, &mut buffer).unwrap();
    let store =
        ResultStore::read_from(&space, &layout, buffer.as_slice()).unwrap();
    assert_eq!(store.repetition_count(), 9);

    let sets = split(&store, 100, &mut rand::rng()).unwrap();
    assert_eq!(sets.training_count(), 9);
    assert_eq!(sets.control_count(), 0);

    let models =
        fit_all(&space, Encoding::Ordinal, &layout, &sets.training).unwrap();
    let elapsed = models.model("elapsed").expect("elapsed model fits");

    let features = space
        .encode(&ParameterTuple::new(["b"]), Encoding::Ordinal)
        .unwrap();
    assert!((elapsed.predict(&features) - 2.0).abs() < 1e-6);

    // An empty control side yields an empty prediction set.
    let predictions =
        predict_all(&space, Encoding::Ordinal, &models, &sets.control).unwrap();
    assert!(predictions.is_empty());
}
