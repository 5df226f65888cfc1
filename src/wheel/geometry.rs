//! Wheel angle math: segment arcs and pointer targeting.
//!
//! Segment 0 starts at the pointer (0°, top) and segments proceed clockwise.
//! The wheel itself rotates clockwise by `R` degrees, so the wheel angle that
//! ends up under the fixed pointer is `-R mod 360`.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;

/// Extra full rotations added to every spin.
pub const DEFAULT_FULL_TURNS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("wheel has no segments")]
    EmptyWheel,
    #[error("segment index {index} out of range for {count} segments")]
    IndexOutOfRange { index: usize, count: usize },
}

pub fn normalize_degrees_360(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Angular width of one segment.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyWheel`] when `count` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn segment_arc_deg(count: usize) -> Result<f64, GeometryError> {
    if count == 0 {
        return Err(GeometryError::EmptyWheel);
    }
    Ok(360.0 / count as f64)
}

/// Start and end angle of segment `index`, measured clockwise from the pointer.
///
/// # Errors
///
/// Returns an error for an empty wheel or an out-of-range index.
#[allow(clippy::cast_precision_loss)]
pub fn segment_bounds_deg(index: usize, count: usize) -> Result<(f64, f64), GeometryError> {
    let arc = segment_arc_deg(count)?;
    if index >= count {
        return Err(GeometryError::IndexOutOfRange { index, count });
    }
    let start = index as f64 * arc;
    Ok((start, start + arc))
}

/// Center angle of segment `index`.
///
/// # Errors
///
/// Returns an error for an empty wheel or an out-of-range index.
pub fn segment_center_deg(index: usize, count: usize) -> Result<f64, GeometryError> {
    let (start, end) = segment_bounds_deg(index, count)?;
    Ok((start + end) / 2.0)
}

/// Cumulative rotation that leaves the center of segment `index` under the
/// pointer after at least `full_turns` complete revolutions past `previous_deg`.
///
/// The result always moves forward: it is at least `previous_deg` rounded up to
/// a whole turn, plus `full_turns * 360`, plus the clockwise distance needed to
/// bring the segment center back to the top.
///
/// # Errors
///
/// Returns an error for an empty wheel or an out-of-range index.
pub fn target_rotation_deg(
    index: usize,
    count: usize,
    previous_deg: f64,
    full_turns: u32,
) -> Result<f64, GeometryError> {
    let center = segment_center_deg(index, count)?;
    let base = if previous_deg.is_finite() && previous_deg > 0.0 {
        (previous_deg / 360.0).ceil() * 360.0
    } else {
        0.0
    };
    Ok(base + f64::from(full_turns) * 360.0 + (360.0 - center))
}

/// Wheel angle currently sitting under the pointer for a cumulative rotation.
pub fn pointer_angle_deg(rotation_deg: f64) -> f64 {
    normalize_degrees_360(-rotation_deg)
}

/// Index of the segment under the pointer for a cumulative rotation.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyWheel`] when `count` is zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn landed_segment(rotation_deg: f64, count: usize) -> Result<usize, GeometryError> {
    let arc = segment_arc_deg(count)?;
    let index = (pointer_angle_deg(rotation_deg) / arc).floor() as usize;
    Ok(index.min(count - 1))
}
