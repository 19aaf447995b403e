//! Layer re-projection and view bounds conversion.
//!
//! Every layer is brought into one planar CRS before any geometry is
//! compared, so intersection tests and drawing share a single frame.

use alert_common::bbox::GeographicBox;
use alert_common::{AlertFeature, AlertMapError, BoundaryLayer, CrsCode, PlanarBounds};
use geo::{coord, Coord, MapCoords, MultiPolygon};
use tracing::debug;

use crate::transverse_mercator::TransverseMercator;

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Unsupported target CRS: {0} (only planar EPSG:32116 is supported)")]
    UnsupportedTarget(CrsCode),

    #[error("Cannot transform from {from} to {to}")]
    UnsupportedTransform { from: CrsCode, to: CrsCode },

    #[error("Coordinate out of range: ({x}, {y})")]
    OutOfRange { x: f64, y: f64 },

    #[error("Bounds did not produce a usable planar extent: {0:?}")]
    DegenerateBounds(PlanarBounds),
}

impl From<ProjectionError> for AlertMapError {
    fn from(err: ProjectionError) -> Self {
        AlertMapError::Projection(err.to_string())
    }
}

/// Re-projects layers into the planar target CRS.
#[derive(Debug, Clone)]
pub struct CrsNormalizer {
    target: CrsCode,
    projection: TransverseMercator,
}

impl CrsNormalizer {
    pub fn new(target: CrsCode) -> Result<Self, ProjectionError> {
        match target {
            CrsCode::Epsg32116 => Ok(Self {
                target,
                projection: TransverseMercator::ny_central(),
            }),
            other => Err(ProjectionError::UnsupportedTarget(other)),
        }
    }

    pub fn target(&self) -> CrsCode {
        self.target
    }

    /// Transform a single coordinate from `source` into the target CRS.
    pub fn project_coord(&self, source: CrsCode, c: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        if source == self.target {
            return Ok(c);
        }
        if !source.is_geographic() {
            return Err(ProjectionError::UnsupportedTransform {
                from: source,
                to: self.target,
            });
        }
        if !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y) {
            return Err(ProjectionError::OutOfRange { x: c.x, y: c.y });
        }

        // NAD83 and WGS84 differ by about a meter here; treated as one datum
        let (x, y) = self.projection.forward(c.x, c.y);
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::OutOfRange { x: c.x, y: c.y });
        }
        Ok(coord! { x: x, y: y })
    }

    pub fn reproject_geometry(
        &self,
        geometry: &MultiPolygon<f64>,
        source: CrsCode,
    ) -> Result<MultiPolygon<f64>, ProjectionError> {
        if source == self.target {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|c| self.project_coord(source, c))
    }

    /// Re-project a backdrop layer.
    pub fn reproject_boundary(
        &self,
        layer: BoundaryLayer,
        source: CrsCode,
    ) -> Result<BoundaryLayer, ProjectionError> {
        if source == self.target {
            return Ok(layer);
        }
        debug!(layer = %layer.kind, from = %source, to = %self.target, "Re-projecting layer");

        let geometries = layer
            .geometries
            .iter()
            .map(|g| self.reproject_geometry(g, source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoundaryLayer::new(layer.kind, geometries))
    }

    /// Re-project alert features, keeping their attributes.
    pub fn reproject_features(
        &self,
        features: Vec<AlertFeature>,
        source: CrsCode,
    ) -> Result<Vec<AlertFeature>, ProjectionError> {
        if source == self.target {
            return Ok(features);
        }
        debug!(count = features.len(), from = %source, to = %self.target, "Re-projecting alerts");

        features
            .into_iter()
            .map(|mut f| {
                f.geometry = self.reproject_geometry(&f.geometry, source)?;
                Ok(f)
            })
            .collect()
    }

    /// Convert the configured lon/lat box into planar view bounds.
    ///
    /// Only the lower-left and upper-right corners are transformed, so the
    /// view is the rectangle spanned by those two projected points.
    pub fn to_planar(&self, bbox: &GeographicBox) -> Result<PlanarBounds, ProjectionError> {
        let lower_left = self.project_coord(
            CrsCode::Epsg4326,
            coord! { x: bbox.min_lon, y: bbox.min_lat },
        )?;
        let upper_right = self.project_coord(
            CrsCode::Epsg4326,
            coord! { x: bbox.max_lon, y: bbox.max_lat },
        )?;

        let bounds = PlanarBounds::from_corners(
            (lower_left.x, lower_left.y),
            (upper_right.x, upper_right.y),
        );
        if !bounds.is_valid() {
            return Err(ProjectionError::DegenerateBounds(bounds));
        }
        Ok(bounds)
    }
}
