//! Shapefile loading.
//!
//! Reads the five input layers into geo geometries. Polygon shapes of every
//! flavour (plain, M, Z) become `MultiPolygon`s; null shapes become empty
//! geometries so the feature still exists but never matches a region.

use std::collections::BTreeMap;
use std::path::Path;

use alert_common::{
    AlertFeature, AlertMapError, AlertMapResult, BoundaryLayer, CrsCode, LayerKind, LayerSet,
};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use projection::CrsNormalizer;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use tracing::{debug, info, warn};

use crate::config::LayersConfig;

/// Loads and normalizes the configured layers.
#[derive(Debug, Clone)]
pub struct LayerStore {
    config: LayersConfig,
}

impl LayerStore {
    pub fn new(config: LayersConfig) -> Self {
        Self { config }
    }

    /// Load every layer and re-project it into the normalizer's target CRS.
    pub fn load_all(&self, normalizer: &CrsNormalizer) -> AlertMapResult<LayerSet> {
        let (hazards, crs) = self.load_hazards()?;
        let hazards = normalizer.reproject_features(hazards, crs)?;

        let boundary = |kind: LayerKind| -> AlertMapResult<BoundaryLayer> {
            let (layer, crs) = self.load_boundary(kind)?;
            Ok(normalizer.reproject_boundary(layer, crs)?)
        };

        let layers = LayerSet {
            hazards,
            target_region: boundary(LayerKind::TargetRegion)?,
            counties: boundary(LayerKind::Counties)?,
            neighbor_states: boundary(LayerKind::NeighborStates)?,
            world: boundary(LayerKind::World)?,
        };

        for (kind, count) in layers.counts() {
            info!(layer = %kind, features = count, "Layer ready");
        }
        Ok(layers)
    }

    /// Alert polygons with their phenomenon/significance codes.
    pub fn load_hazards(&self) -> AlertMapResult<(Vec<AlertFeature>, CrsCode)> {
        let kind = LayerKind::Hazards;
        let path = self.config.path(kind);
        let rows = read_shapes_and_records(&path, kind)?;

        let features = rows
            .into_iter()
            .map(|(geometry, record)| {
                feature_from_record(
                    geometry,
                    record,
                    &self.config.phenomenon_field,
                    &self.config.significance_field,
                )
            })
            .collect::<Vec<_>>();

        let missing_codes = features
            .iter()
            .filter(|f| f.phenomenon.is_empty() || f.significance.is_empty())
            .count();
        if missing_codes > 0 {
            warn!(
                count = missing_codes,
                phenomenon_field = %self.config.phenomenon_field,
                significance_field = %self.config.significance_field,
                "Alerts without phenomenon/significance codes"
            );
        }

        Ok((features, self.source_crs(kind, &path)?))
    }

    /// Backdrop polygons; attributes are not read.
    pub fn load_boundary(&self, kind: LayerKind) -> AlertMapResult<(BoundaryLayer, CrsCode)> {
        let path = self.config.path(kind);
        let geometries = read_shapes_and_records(&path, kind)?
            .into_iter()
            .map(|(geometry, _)| geometry)
            .collect();

        let crs = self.source_crs(kind, &path)?;
        Ok((BoundaryLayer::new(kind, geometries), crs))
    }

    /// Configured CRS, else the `.prj` sidecar, else WGS84.
    ///
    /// A `.prj` naming a projected system other than the supported ones is
    /// a `LayerLoad` error.
    pub fn source_crs(&self, kind: LayerKind, path: &Path) -> AlertMapResult<CrsCode> {
        if let Some(crs) = self.config.source(kind).crs {
            return Ok(crs);
        }

        let prj = path.with_extension("prj");
        let wkt = match std::fs::read_to_string(&prj) {
            Ok(wkt) => wkt,
            Err(_) => {
                warn!(layer = %kind, path = %path.display(), "No .prj and no configured CRS, assuming EPSG:4326");
                return Ok(CrsCode::Epsg4326);
            }
        };

        if let Some(crs) = CrsCode::detect_from_wkt(&wkt) {
            debug!(layer = %kind, crs = %crs, "CRS detected from .prj");
            return Ok(crs);
        }

        if wkt.trim_start().to_uppercase().starts_with("PROJCS") {
            return Err(AlertMapError::LayerLoad {
                layer: kind.to_string(),
                path: prj.display().to_string(),
                reason: format!(
                    "unsupported projected CRS '{}'; set the layer crs in configuration",
                    wkt_name(&wkt).unwrap_or("unnamed")
                ),
            });
        }

        warn!(layer = %kind, path = %prj.display(), "Unrecognized .prj, assuming EPSG:4326");
        Ok(CrsCode::Epsg4326)
    }
}

/// The quoted name of the outermost WKT node, e.g. `PROJCS["name", ...]`.
fn wkt_name(wkt: &str) -> Option<&str> {
    let start = wkt.find('"')? + 1;
    let len = wkt[start..].find('"')?;
    Some(&wkt[start..start + len])
}

fn read_shapes_and_records(
    path: &Path,
    kind: LayerKind,
) -> AlertMapResult<Vec<(MultiPolygon<f64>, Record)>> {
    let load_error = |reason: String| AlertMapError::LayerLoad {
        layer: kind.to_string(),
        path: path.display().to_string(),
        reason,
    };

    let mut reader = shapefile::Reader::from_path(path).map_err(|e| load_error(e.to_string()))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item.map_err(|e| load_error(e.to_string()))?;
        match shape_to_multipolygon(shape) {
            Some(geometry) => rows.push((geometry, record)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(layer = %kind, skipped, "Skipped non-polygon shapes");
    }
    debug!(layer = %kind, path = %path.display(), features = rows.len(), "Read shapefile");
    Ok(rows)
}

/// `None` for shapes that are not polygons.
fn shape_to_multipolygon(shape: Shape) -> Option<MultiPolygon<f64>> {
    match shape {
        Shape::NullShape => Some(MultiPolygon::new(Vec::new())),
        Shape::Polygon(p) => Some(rings_to_multipolygon(p.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonM(p) => Some(rings_to_multipolygon(p.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonZ(p) => Some(rings_to_multipolygon(p.rings(), |pt| (pt.x, pt.y))),
        _ => None,
    }
}

/// Each outer ring opens a polygon; inner rings become holes of the last one.
///
/// An inner ring before any outer ring is promoted to an outer ring.
pub fn rings_to_multipolygon<P>(
    rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> (f64, f64),
) -> MultiPolygon<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

    for ring in rings {
        let line: LineString<f64> = ring
            .points()
            .iter()
            .map(|p| {
                let (x, y) = xy(p);
                Coord { x, y }
            })
            .collect();

        if let PolygonRing::Inner(_) = ring {
            if let Some((_, holes)) = polygons.last_mut() {
                holes.push(line);
                continue;
            }
        }
        polygons.push((line, Vec::new()));
    }

    MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(exterior, holes)| Polygon::new(exterior, holes))
            .collect(),
    )
}

/// Split the attribute row into codes and passthrough attributes.
pub fn feature_from_record(
    geometry: MultiPolygon<f64>,
    record: Record,
    phenomenon_field: &str,
    significance_field: &str,
) -> AlertFeature {
    let mut phenomenon = String::new();
    let mut significance = String::new();
    let mut attributes = BTreeMap::new();

    for (name, value) in record {
        let text = field_text(&value);
        if name == phenomenon_field {
            phenomenon = text;
        } else if name == significance_field {
            significance = text;
        } else {
            attributes.insert(name, text);
        }
    }

    AlertFeature {
        geometry,
        phenomenon,
        significance,
        attributes,
    }
}

/// Trimmed text form of a dBase value; empty for nulls.
fn field_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Character(Some(s)) => s.trim().to_string(),
        FieldValue::Memo(s) => s.trim().to_string(),
        FieldValue::Numeric(Some(n)) => n.to_string(),
        FieldValue::Float(Some(n)) => n.to_string(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Double(n) => n.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None) => String::new(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use shapefile::Point;

    fn ring(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_outer_rings_become_polygons() {
        let rings = vec![
            PolygonRing::Outer(ring(&[(0., 0.), (0., 10.), (10., 10.), (10., 0.), (0., 0.)])),
            PolygonRing::Inner(ring(&[(2., 2.), (4., 2.), (4., 4.), (2., 4.), (2., 2.)])),
            PolygonRing::Outer(ring(&[(20., 0.), (20., 5.), (25., 5.), (25., 0.), (20., 0.)])),
        ];

        let mp = rings_to_multipolygon(&rings, |p| (p.x, p.y));

        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!(mp.0[1].interiors().is_empty());
        assert!((mp.unsigned_area() - (100.0 - 4.0 + 25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_leading_inner_ring_promoted() {
        let rings = vec![PolygonRing::Inner(ring(&[
            (0., 0.),
            (1., 0.),
            (1., 1.),
            (0., 0.),
        ]))];
        let mp = rings_to_multipolygon(&rings, |p| (p.x, p.y));
        assert_eq!(mp.0.len(), 1);
    }

    #[test]
    fn test_null_shape_is_empty_geometry() {
        let mp = shape_to_multipolygon(Shape::NullShape).unwrap();
        assert!(mp.0.is_empty());
        assert!(shape_to_multipolygon(Shape::Point(Point::new(1.0, 2.0))).is_none());
    }

    #[test]
    fn test_record_codes_and_attributes() {
        let mut record = Record::default();
        record.insert("PHENOM".to_string(), FieldValue::Character(Some("RP ".to_string())));
        record.insert("SIG".to_string(), FieldValue::Character(Some("S".to_string())));
        record.insert("WFO".to_string(), FieldValue::Character(Some("OKX".to_string())));
        record.insert("ETN".to_string(), FieldValue::Numeric(Some(12.0)));

        let feature = feature_from_record(MultiPolygon::new(vec![]), record, "PHENOM", "SIG");

        assert_eq!(feature.phenomenon, "RP");
        assert_eq!(feature.significance, "S");
        assert_eq!(feature.attributes.get("WFO").map(String::as_str), Some("OKX"));
        assert_eq!(feature.attributes.get("ETN").map(String::as_str), Some("12"));
        assert!(!feature.attributes.contains_key("PHENOM"));
    }

    #[test]
    fn test_custom_field_names() {
        let mut record = Record::default();
        record.insert("phenom".to_string(), FieldValue::Character(Some("BH".to_string())));
        record.insert("sig".to_string(), FieldValue::Character(None));

        let feature = feature_from_record(MultiPolygon::new(vec![]), record, "phenom", "sig");
        assert_eq!(feature.phenomenon, "BH");
        assert_eq!(feature.significance, "");
    }

    #[test]
    fn test_missing_file_is_layer_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = LayersConfig {
            directory: dir.path().to_path_buf(),
            ..LayersConfig::default()
        };
        let store = LayerStore::new(config);

        match store.load_boundary(LayerKind::Counties) {
            Err(AlertMapError::LayerLoad { layer, path, .. }) => {
                assert_eq!(layer, LayerKind::Counties.to_string());
                assert!(path.ends_with("NYS Counties.shp"));
            }
            other => panic!("expected LayerLoad error, got {:?}", other.map(|(l, _)| l.len())),
        }
    }

    #[test]
    fn test_crs_from_config_then_prj_then_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LayersConfig {
            directory: dir.path().to_path_buf(),
            ..LayersConfig::default()
        };
        config.world.crs = Some(CrsCode::Epsg32116);
        let store = LayerStore::new(config.clone());

        assert_eq!(
            store
                .source_crs(LayerKind::World, &config.path(LayerKind::World))
                .unwrap(),
            CrsCode::Epsg32116
        );

        let counties = config.path(LayerKind::Counties);
        assert_eq!(
            store.source_crs(LayerKind::Counties, &counties).unwrap(),
            CrsCode::Epsg4326
        );

        std::fs::write(
            counties.with_extension("prj"),
            r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#,
        )
        .unwrap();
        assert_eq!(
            store.source_crs(LayerKind::Counties, &counties).unwrap(),
            CrsCode::Epsg4269
        );
    }

    #[test]
    fn test_unsupported_projected_prj_is_layer_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = LayersConfig {
            directory: dir.path().to_path_buf(),
            ..LayersConfig::default()
        };
        let store = LayerStore::new(config.clone());
        let counties = config.path(LayerKind::Counties);
        std::fs::write(
            counties.with_extension("prj"),
            r#"PROJCS["NAD_1983_UTM_Zone_18N",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]]],PROJECTION["Transverse_Mercator"],PARAMETER["Central_Meridian",-75.0],UNIT["Meter",1.0]]"#,
        )
        .unwrap();

        match store.source_crs(LayerKind::Counties, &counties) {
            Err(AlertMapError::LayerLoad { layer, reason, .. }) => {
                assert_eq!(layer, LayerKind::Counties.to_string());
                assert!(reason.contains("NAD_1983_UTM_Zone_18N"), "reason was {reason}");
            }
            other => panic!("expected LayerLoad error, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_prj_falls_back_to_wgs84() {
        let dir = tempfile::tempdir().unwrap();
        let config = LayersConfig {
            directory: dir.path().to_path_buf(),
            ..LayersConfig::default()
        };
        let store = LayerStore::new(config.clone());
        let world = config.path(LayerKind::World);
        std::fs::write(world.with_extension("prj"), "not wkt at all").unwrap();

        assert_eq!(
            store.source_crs(LayerKind::World, &world).unwrap(),
            CrsCode::Epsg4326
        );
    }
}
