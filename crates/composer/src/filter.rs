//! Alert selection: spatial join against the region, then code match.

use alert_common::{AlertFeature, BoundaryLayer, ResolvedHazard};
use geo::{BoundingRect, Intersects, MultiPolygon, Rect};

/// Region polygons with their bounding rectangles, for cheap rejection.
struct RegionIndex<'r> {
    parts: Vec<(Rect<f64>, &'r MultiPolygon<f64>)>,
}

impl<'r> RegionIndex<'r> {
    fn new(region: &'r BoundaryLayer) -> Self {
        let parts = region
            .geometries
            .iter()
            .filter_map(|g| g.bounding_rect().map(|rect| (rect, g)))
            .collect();
        Self { parts }
    }

    fn intersects(&self, geometry: &MultiPolygon<f64>) -> bool {
        let Some(rect) = geometry.bounding_rect() else {
            return false;
        };
        self.parts
            .iter()
            .any(|(region_rect, region)| rect.intersects(region_rect) && geometry.intersects(*region))
    }
}

/// Features whose geometry touches any polygon of the region layer.
///
/// This is an inner intersection join without clipping: a feature that only
/// partly overlaps the region is returned whole, and a feature that touches
/// several region polygons is returned once. Features with empty geometry
/// never match. Input order is preserved.
pub fn features_in_region<'a>(
    features: &'a [AlertFeature],
    region: &BoundaryLayer,
) -> Vec<&'a AlertFeature> {
    let index = RegionIndex::new(region);
    features
        .iter()
        .filter(|f| index.intersects(&f.geometry))
        .collect()
}

/// Features whose phenomenon AND significance both equal the hazard's.
pub fn matching_features<'a, I>(candidates: I, hazard: &ResolvedHazard) -> Vec<&'a AlertFeature>
where
    I: IntoIterator<Item = &'a AlertFeature>,
{
    candidates
        .into_iter()
        .filter(|f| hazard.matches(&f.phenomenon, &f.significance))
        .collect()
}

/// Spatial join followed by the attribute filter.
pub fn select_hazards<'a>(
    features: &'a [AlertFeature],
    region: &BoundaryLayer,
    hazard: &ResolvedHazard,
) -> Vec<&'a AlertFeature> {
    let in_region = features_in_region(features, region);
    matching_features(in_region, hazard)
}
