//! Tests for error module

use geospread::error::{GeospreadError, OptionExt};

#[test]
fn test_error_display() {
    let err = GeospreadError::invalid_geometry("point-7", "self-intersecting ring");
    assert!(err.to_string().contains("point-7"));
    assert!(err.to_string().contains("self-intersecting ring"));

    let err = GeospreadError::not_found("POI", "mechelen");
    assert_eq!(err.to_string(), "POI 'mechelen' not found");
}

#[test]
fn test_invariant_violation_display() {
    let err = GeospreadError::invariant("point 'x' lies in no cluster zone");
    assert!(err.to_string().starts_with("invariant violation:"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_not_found("zone", "abc");
    assert!(matches!(result, Err(GeospreadError::NotFound { .. })));

    let some = Some(3).ok_or_not_found("zone", "abc");
    assert_eq!(some.unwrap(), 3);
}
