//! Segment layout for rendering clients.
//!
//! Every non-self participant gets a slice, drawn or not. Participants who
//! were already drawn keep their slot but switch to a muted fill so the wheel
//! geometry stays stable between draws.

use serde::Serialize;

use super::geometry;
use crate::store::Participant;

const AVAILABLE_SATURATION: u8 = 70;
const AVAILABLE_LIGHTNESS: u8 = 50;
const MUTED_SATURATION: u8 = 10;
const MUTED_LIGHTNESS: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    /// CSS `hsl(...)` notation.
    #[must_use]
    pub fn css(&self) -> String {
        format!("hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelSegment {
    pub id: String,
    pub start_deg: f64,
    pub end_deg: f64,
    /// Where the label sits (segment center).
    pub label_deg: f64,
    pub available: bool,
    pub fill: Hsl,
    /// `fill` in CSS notation.
    pub color: String,
}

#[allow(clippy::cast_precision_loss)]
fn segment_fill(index: usize, count: usize, available: bool) -> Hsl {
    if available {
        Hsl { hue: (index as f64 * 360.0) / count as f64, saturation: AVAILABLE_SATURATION, lightness: AVAILABLE_LIGHTNESS }
    } else {
        Hsl { hue: 0.0, saturation: MUTED_SATURATION, lightness: MUTED_LIGHTNESS }
    }
}

/// Lay out one segment per candidate, in candidate order.
#[must_use]
pub fn layout_segments(candidates: &[&Participant]) -> Vec<WheelSegment> {
    let count = candidates.len();
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, person)| {
            let (start_deg, end_deg) = geometry::segment_bounds_deg(index, count).ok()?;
            let fill = segment_fill(index, count, person.available);
            Some(WheelSegment {
                id: person.id.clone(),
                start_deg,
                end_deg,
                label_deg: (start_deg + end_deg) / 2.0,
                available: person.available,
                color: fill.css(),
                fill,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, available: bool) -> Participant {
        Participant { id: id.into(), available, assigned_to: None }
    }

    #[test]
    fn empty_candidates_produce_no_segments() {
        assert!(layout_segments(&[]).is_empty());
    }

    #[test]
    fn segments_cover_the_full_circle_in_order() {
        let a = person("A", true);
        let b = person("B", false);
        let c = person("C", true);
        let segments = layout_segments(&[&a, &b, &c]);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].id, "A");
        assert!((segments[0].start_deg).abs() < f64::EPSILON);
        assert!((segments[2].end_deg - 360.0).abs() < 1e-9);
        assert!((segments[1].label_deg - 180.0).abs() < 1e-9);
    }

    #[test]
    fn unavailable_segments_are_muted() {
        let a = person("A", true);
        let b = person("B", false);
        let segments = layout_segments(&[&a, &b]);

        assert!(segments[0].available);
        assert_eq!(segments[0].fill.saturation, AVAILABLE_SATURATION);
        assert!(!segments[1].available);
        assert_eq!(segments[1].fill, Hsl { hue: 0.0, saturation: MUTED_SATURATION, lightness: MUTED_LIGHTNESS });
        assert_eq!(segments[1].color, "hsl(0, 10%, 30%)");
    }

    #[test]
    fn available_hues_spread_by_position() {
        let people: Vec<Participant> = ["A", "B", "C", "D"].iter().map(|id| person(id, true)).collect();
        let refs: Vec<&Participant> = people.iter().collect();
        let hues: Vec<f64> = layout_segments(&refs).iter().map(|s| s.fill.hue).collect();
        assert_eq!(hues, vec![0.0, 90.0, 180.0, 270.0]);
    }
}
