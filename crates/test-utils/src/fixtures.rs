//! Common test fixtures for alert-mapping tests.
//!
//! The synthetic world is laid out in planar meters:
//!
//! ```text
//!   world           -5000..5000 on both axes
//!   neighbor states  two strips west (-1000..0) and south (0..1000, -1000..0)
//!   target region    square 0..1000 split into four county quadrants
//!   view             -500..1500 on both axes
//! ```

use alert_common::{
    AlertFeature, BoundaryLayer, HazardDefinition, LayerKind, LayerSet, PlanarBounds,
};
use chrono::{NaiveDate, NaiveDateTime};

use crate::generators::{rect, square};

/// Side of the square target region.
pub const REGION_SIZE: f64 = 1000.0;

/// View bounds framing the target region with a 500 m margin.
pub fn view_bounds() -> PlanarBounds {
    PlanarBounds::new(-500.0, -500.0, 1500.0, 1500.0)
}

/// A fixed render time: 2024-09-06 15:07.
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 6)
        .and_then(|d| d.and_hms_opt(15, 7, 0))
        .expect("valid fixed timestamp")
}

/// Boundary layers around the synthetic region, with the given alerts.
pub fn layer_set_with(hazards: Vec<AlertFeature>) -> LayerSet {
    let half = REGION_SIZE / 2.0;
    LayerSet {
        hazards,
        target_region: BoundaryLayer::new(
            LayerKind::TargetRegion,
            vec![square(0.0, 0.0, REGION_SIZE)],
        ),
        counties: BoundaryLayer::new(
            LayerKind::Counties,
            vec![
                square(0.0, 0.0, half),
                square(half, 0.0, half),
                square(0.0, half, half),
                square(half, half, half),
            ],
        ),
        neighbor_states: BoundaryLayer::new(
            LayerKind::NeighborStates,
            vec![
                rect(-1000.0, 0.0, 1000.0, REGION_SIZE),
                rect(0.0, -1000.0, REGION_SIZE, 1000.0),
            ],
        ),
        world: BoundaryLayer::new(LayerKind::World, vec![square(-5000.0, -5000.0, 10000.0)]),
    }
}

/// Alerts covering every filtering case:
///
/// - RP/S inside the region (matches Rip Current)
/// - RP/S outside the region
/// - RP/W inside the region (wrong significance)
/// - BH/S straddling the region edge (matches Beach Hazards, kept whole)
pub fn mixed_alerts() -> Vec<AlertFeature> {
    vec![
        AlertFeature::new(square(100.0, 100.0, 200.0), "RP", "S"),
        AlertFeature::new(square(3000.0, 3000.0, 200.0), "RP", "S"),
        AlertFeature::new(square(600.0, 600.0, 200.0), "RP", "W"),
        AlertFeature::new(square(900.0, 400.0, 300.0), "BH", "S"),
    ]
}

/// Synthetic layers with [`mixed_alerts`].
pub fn mixed_layer_set() -> LayerSet {
    layer_set_with(mixed_alerts())
}

/// The default hazard table: the sentinel plus two coastal statements.
pub fn default_definitions() -> Vec<HazardDefinition> {
    vec![
        HazardDefinition::sentinel("None"),
        HazardDefinition::new("Rip Current", "RP", "S", "Statement", "#40E0D0"),
        HazardDefinition::new("Beach Hazards", "BH", "S", "Statement", "#40E0D0"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_contains_region() {
        let view = view_bounds();
        assert!(view.x_min <= 0.0 && view.y_min <= 0.0);
        assert!(view.x_max >= REGION_SIZE && view.y_max >= REGION_SIZE);
    }

    #[test]
    fn test_layer_set_counts() {
        let layers = mixed_layer_set();
        assert_eq!(layers.hazards.len(), 4);
        assert_eq!(layers.counties.len(), 4);
        assert_eq!(layers.target_region.len(), 1);
    }
}
