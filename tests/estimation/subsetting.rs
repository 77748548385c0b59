//! Integration tests for row and time-window selection

use crate::test_helpers::reference_experiment;
use enzkin_rs::{KineticsError, NormalizedDataset, Subset, SubsetSpec};
use ndarray::{array, s};

fn dataset() -> NormalizedDataset {
    NormalizedDataset::from_experiment(&reference_experiment()).unwrap()
}

#[test]
fn test_full_filter_without_bounds_is_identity() {
    let dataset = dataset();
    let spec = SubsetSpec::new().with_initial_substrates(vec![100.0, 200.0, 300.0]);
    let subset = Subset::select(&dataset, &spec).unwrap();

    assert_eq!(subset.substrate(), dataset.substrate());
    assert_eq!(subset.product(), dataset.product());
    assert_eq!(subset.inhibitor(), dataset.inhibitor());
    assert_eq!(subset.time(), dataset.time());
    assert_eq!(subset, Subset::full(&dataset).unwrap());
}

#[test]
fn test_unknown_concentration_lists_known_values() {
    let spec = SubsetSpec::new().with_initial_substrates(vec![150.0]);

    let err = Subset::select(&dataset(), &spec).unwrap_err();
    match &err {
        KineticsError::UnknownInitialSubstrate { requested, known } => {
            assert_eq!(*requested, 150.0);
            assert_eq!(known, &vec![100.0, 200.0, 300.0]);
        }
        other => panic!("expected selection error, got {:?}", other),
    }
    assert!(err.to_string().contains("150 not found"));
}

#[test]
fn test_rows_in_request_order() {
    let spec = SubsetSpec::new().with_initial_substrates(vec![300.0, 100.0]);
    let subset = Subset::select(&dataset(), &spec).unwrap();

    assert_eq!(subset.rows(), &[6, 7, 8, 0, 1, 2]);
    assert_eq!(subset.enzyme(), &array![0.11, 0.11, 0.11, 0.05, 0.05, 0.05]);
    assert_eq!(subset.unique_initial_substrates(), vec![100.0, 300.0]);
}

#[test]
fn test_slice_semantics() {
    let dataset = dataset();
    let cases: [(Option<isize>, Option<isize>, &[f64]); 5] = [
        (Some(1), None, &[2.0, 4.0, 6.0, 8.0, 9.0]),
        (None, Some(-2), &[0.0, 2.0, 4.0, 6.0]),
        (Some(-3), Some(-1), &[6.0, 8.0]),
        (Some(-100), Some(2), &[0.0, 2.0]),
        (Some(4), Some(100), &[8.0, 9.0]),
    ];

    for (start, stop, expected) in cases {
        let spec = SubsetSpec {
            initial_substrates: None,
            start_time_index: start,
            stop_time_index: stop,
        };
        let subset = Subset::select(&dataset, &spec).unwrap();
        assert_eq!(subset.time().to_vec(), expected.to_vec(), "window {:?}..{:?}", start, stop);

        let window = spec.time_window(dataset.n_times());
        assert_eq!(subset.substrate(), &dataset.substrate().slice(s![.., window.clone()]));
        assert_eq!(subset.product(), &dataset.product().slice(s![.., window]));
    }
}

#[test]
fn test_empty_window() {
    let spec = SubsetSpec::new().with_start_time_index(-1).with_stop_time_index(-1);
    assert!(matches!(
        Subset::select(&dataset(), &spec),
        Err(KineticsError::EmptySelection(_))
    ));
}

#[test]
fn test_replicate_means_per_concentration() {
    let subset = Subset::full(&dataset()).unwrap();
    let stats = subset.replicate_statistics(subset.product().view()).unwrap();

    assert_eq!(stats.initial_substrates, vec![100.0, 200.0, 300.0]);
    assert_eq!(stats.mean.shape(), &[3, 6]);
    assert!((stats.mean[[0, 1]] - (8.0 + 8.3 + 7.8) / 3.0).abs() < 1e-12);
    assert_eq!(stats.std[[2, 0]], 0.0);
}
