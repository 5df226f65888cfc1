use super::*;

#[test]
fn normalize_degrees_360_wraps_values() {
    assert_eq!(normalize_degrees_360(0.0), 0.0);
    assert_eq!(normalize_degrees_360(370.0), 10.0);
    assert_eq!(normalize_degrees_360(-10.0), 350.0);
    assert_eq!(normalize_degrees_360(720.0), 0.0);
}

#[test]
fn segment_arc_rejects_empty_wheel() {
    assert_eq!(segment_arc_deg(0), Err(GeometryError::EmptyWheel));
    assert_eq!(segment_arc_deg(4), Ok(90.0));
}

#[test]
fn segment_bounds_are_consecutive_from_pointer() {
    assert_eq!(segment_bounds_deg(0, 4), Ok((0.0, 90.0)));
    assert_eq!(segment_bounds_deg(3, 4), Ok((270.0, 360.0)));
    assert_eq!(segment_bounds_deg(4, 4), Err(GeometryError::IndexOutOfRange { index: 4, count: 4 }));
}

#[test]
fn target_rotation_matches_reference_values() {
    // Four segments, centers at 45/135/225/315.
    assert_eq!(target_rotation_deg(0, 4, 0.0, 5), Ok(1800.0 + 315.0));
    assert_eq!(target_rotation_deg(1, 4, 0.0, 5), Ok(1800.0 + 225.0));
    assert_eq!(target_rotation_deg(3, 4, 0.0, 5), Ok(1800.0 + 45.0));
    // Single segment wheel lands on its only center.
    assert_eq!(target_rotation_deg(0, 1, 0.0, 5), Ok(1800.0 + 180.0));
}

#[test]
fn target_rotation_rejects_bad_input() {
    assert_eq!(target_rotation_deg(0, 0, 0.0, 5), Err(GeometryError::EmptyWheel));
    assert_eq!(
        target_rotation_deg(5, 5, 0.0, 5),
        Err(GeometryError::IndexOutOfRange { index: 5, count: 5 })
    );
}

#[test]
fn every_target_lands_inside_its_segment() {
    for count in 1..=48 {
        let arc = segment_arc_deg(count).unwrap();
        for index in 0..count {
            let rotation = target_rotation_deg(index, count, 0.0, DEFAULT_FULL_TURNS).unwrap();
            let under_pointer = pointer_angle_deg(rotation);
            #[allow(clippy::cast_precision_loss)]
            let start = index as f64 * arc;
            assert!(
                under_pointer >= start && under_pointer < start + arc,
                "count {count} index {index}: pointer at {under_pointer}, segment [{start}, {})",
                start + arc
            );
            assert_eq!(landed_segment(rotation, count).unwrap(), index);
        }
    }
}

#[test]
fn every_target_includes_minimum_full_turns() {
    for count in 1..=24 {
        for index in 0..count {
            let rotation = target_rotation_deg(index, count, 0.0, 5).unwrap();
            assert!(rotation >= 1800.0, "rotation {rotation} below five turns");
        }
    }
}

#[test]
fn target_moves_forward_from_previous_rotation() {
    for previous in [0.0, 45.0, 359.9, 360.0, 2115.0, 5000.5] {
        let rotation = target_rotation_deg(2, 7, previous, 5).unwrap();
        assert!(rotation - previous >= 1800.0, "previous {previous} -> {rotation}");
        assert_eq!(landed_segment(rotation, 7).unwrap(), 2);
    }
}

#[test]
fn non_finite_previous_rotation_is_treated_as_zero() {
    assert_eq!(target_rotation_deg(0, 4, f64::NAN, 5), target_rotation_deg(0, 4, 0.0, 5));
}

#[test]
fn zero_rotation_points_at_segment_zero() {
    assert_eq!(landed_segment(0.0, 6).unwrap(), 0);
    assert_eq!(pointer_angle_deg(90.0), 270.0);
    assert_eq!(landed_segment(90.0, 4).unwrap(), 3);
}
