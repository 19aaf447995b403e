//! Pipeline tests against real NWS data, when present.
//!
//! These tests look for the extracted archive and boundary shapefiles via
//! `TEST_DATA_DIR` or `MappingElements/` and skip otherwise.

use alert_common::{CrsCode, LayerKind};
use alert_mapper::config::LayersConfig;
use alert_mapper::LayerStore;
use projection::CrsNormalizer;
use test_utils::require_test_file;

#[test]
fn test_load_real_alert_layer() {
    let path = require_test_file!("current_all.shp");
    let dir = path.parent().unwrap().to_path_buf();

    let store = LayerStore::new(LayersConfig {
        directory: dir,
        ..LayersConfig::default()
    });
    let (features, crs) = store.load_hazards().unwrap();

    assert!(crs.is_geographic());
    // Every active alert carries both codes
    assert!(features
        .iter()
        .filter(|f| f.has_geometry())
        .all(|f| !f.phenomenon.is_empty()));
}

#[test]
fn test_reproject_real_counties() {
    let path = require_test_file!("NYS Counties.shp");
    let dir = path.parent().unwrap().to_path_buf();

    let store = LayerStore::new(LayersConfig {
        directory: dir,
        ..LayersConfig::default()
    });
    let normalizer = CrsNormalizer::new(CrsCode::Epsg32116).unwrap();
    let (layer, crs) = store.load_boundary(LayerKind::Counties).unwrap();
    let projected = normalizer.reproject_boundary(layer, crs).unwrap();

    // New York has 62 counties
    assert!(projected.len() >= 62);
}
