//! Integration tests for the Parameter struct

use approx::assert_relative_eq;
use enzkin_rs::parameters::{Bounds, BoundsTransform, Parameter, ParameterError};

#[test]
fn test_parameter_basic_operations() {
    let mut param = Parameter::new("k_cat", 10.0);
    assert_eq!(param.name(), "k_cat");
    assert_eq!(param.value(), 10.0);
    assert!(param.vary());
    assert!(param.stderr().is_none());

    param.set_value(12.5).unwrap();
    param.set_stderr(Some(0.5));
    assert_eq!(param.value(), 12.5);
    assert_eq!(param.stderr(), Some(0.5));
}

#[test]
fn test_bounded_parameter_rejects_outside_values() {
    let mut param = Parameter::with_bounds("Km", 5.0, 0.05, 500.0).unwrap();
    assert!(matches!(param.set_value(600.0), Err(ParameterError::BoundsError(_))));
    assert_eq!(param.value(), 5.0);

    assert!(Parameter::with_bounds("Km", 5.0, 10.0, 1.0).is_err());
}

#[test]
fn test_internal_coordinates_roundtrip() {
    let param = Parameter::with_bounds("K_ie", 0.01, 1e-4, 0.9999).unwrap();
    let internal = param.to_internal().unwrap();
    assert_relative_eq!(param.from_internal(internal), 0.01, epsilon = 1e-12);

    // Any internal value maps back inside the bounds.
    for internal in [-100.0, -1.0, 0.0, 2.5, 1e6] {
        let external = param.from_internal(internal);
        assert!((1e-4..=0.9999).contains(&external));
    }
}

#[test]
fn test_one_sided_transform() {
    let transform = BoundsTransform::new(Bounds::min_only(0.0));
    for external in [0.0, 0.5, 3.0, 250.0] {
        let internal = transform.to_internal(external).unwrap();
        assert_relative_eq!(transform.to_external(internal), external, epsilon = 1e-9);
    }
    assert!(transform.to_internal(-1.0).is_err());
    assert!(transform.to_internal(f64::NAN).is_err());
}
