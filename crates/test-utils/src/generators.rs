//! Generators for synthetic planar geometry.
//!
//! Everything is axis-aligned and in plain meters so expected intersections
//! can be worked out by hand.

use geo::{polygon, LineString, MultiPolygon, Polygon};

/// An axis-aligned square with its lower-left corner at (x, y).
pub fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
    rect(x, y, size, size)
}

/// An axis-aligned rectangle with its lower-left corner at (x, y).
pub fn rect(x: f64, y: f64, width: f64, height: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x, y: y),
        (x: x + width, y: y),
        (x: x + width, y: y + height),
        (x: x, y: y + height),
        (x: x, y: y),
    ]])
}

/// A square with a square hole in the middle (a ring).
pub fn square_with_hole(x: f64, y: f64, size: f64, hole: f64) -> MultiPolygon<f64> {
    let inset = (size - hole) / 2.0;
    let exterior = LineString::from(vec![
        (x, y),
        (x + size, y),
        (x + size, y + size),
        (x, y + size),
        (x, y),
    ]);
    let interior = LineString::from(vec![
        (x + inset, y + inset),
        (x + inset + hole, y + inset),
        (x + inset + hole, y + inset + hole),
        (x + inset, y + inset + hole),
        (x + inset, y + inset),
    ]);
    MultiPolygon::new(vec![Polygon::new(exterior, vec![interior])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_square_area() {
        assert_eq!(square(0.0, 0.0, 10.0).unsigned_area(), 100.0);
    }

    #[test]
    fn test_hole_is_subtracted() {
        assert_eq!(square_with_hole(0.0, 0.0, 10.0, 4.0).unsigned_area(), 84.0);
    }
}
