//! End-to-end tests of the map run on synthetic layers.
//!
//! No network and no shapefiles: layers come from the shared fixtures and
//! maps are written to a temporary directory.

use alert_common::HazardDefinition;
use alert_mapper::config::OutputConfig;
use alert_mapper::MapRun;
use composer::{ComposerConfig, HazardMapComposer};
use renderer::{FontSet, RasterOptions, SceneRasterizer};
use test_utils::{default_definitions, fixed_now, mixed_layer_set, temp_test_dir, view_bounds};

fn map_run(dir: &std::path::Path, continue_on_error: bool) -> MapRun {
    MapRun::new(
        HazardMapComposer::new(ComposerConfig::default()),
        SceneRasterizer::with_fonts(
            RasterOptions {
                width: 200,
                height: 200,
                ..RasterOptions::default()
            },
            FontSet::empty(),
        ),
        OutputConfig {
            directory: dir.to_path_buf(),
            continue_on_error,
            ..OutputConfig::default()
        },
    )
}

fn broken_definition() -> HazardDefinition {
    let mut def = HazardDefinition::new("Storm Surge", "SS", "W", "Warning", "#B524F7");
    def.color = None;
    def
}

#[test]
fn test_one_png_per_definition() {
    let dir = temp_test_dir();
    let run = map_run(dir.path(), true);

    let summary = run
        .render_all(&mixed_layer_set(), &default_definitions(), view_bounds(), fixed_now)
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.written.len(), 3);
    for name in ["None", "Rip Current", "Beach Hazards"] {
        let path = dir.path().join(format!("Current_NY_{}_Alert.png", name));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }
}

#[test]
fn test_failed_definition_does_not_stop_run() {
    let dir = temp_test_dir();
    let run = map_run(dir.path(), true);
    let mut definitions = default_definitions();
    definitions.insert(1, broken_definition());

    let summary = run
        .render_all(&mixed_layer_set(), &definitions, view_bounds(), fixed_now)
        .unwrap();

    assert_eq!(summary.written.len(), 3);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "Storm Surge");
    assert!(summary.failed[0].1.contains("color"));
    assert!(!dir.path().join("Current_NY_Storm Surge_Alert.png").exists());
    assert!(dir.path().join("Current_NY_Beach Hazards_Alert.png").exists());
}

#[test]
fn test_halt_policy_stops_at_first_failure() {
    let dir = temp_test_dir();
    let run = map_run(dir.path(), false);
    let mut definitions = default_definitions();
    definitions.insert(1, broken_definition());

    let result = run.render_all(&mixed_layer_set(), &definitions, view_bounds(), fixed_now);

    assert!(result.is_err());
    assert!(dir.path().join("Current_NY_None_Alert.png").exists());
    assert!(!dir.path().join("Current_NY_Rip Current_Alert.png").exists());
}

#[test]
fn test_rerun_overwrites_artifacts() {
    let dir = temp_test_dir();
    let run = map_run(dir.path(), true);
    let path = run.artifact_path("Rip Current");
    std::fs::write(&path, b"stale").unwrap();

    run.render_one(
        &mixed_layer_set(),
        &default_definitions()[1],
        view_bounds(),
        fixed_now(),
    )
    .unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_ne!(bytes, b"stale");
    assert!(image_header_ok(&bytes));
}

#[test]
fn test_output_directory_created() {
    let dir = temp_test_dir();
    let nested = dir.path().join("maps").join("today");
    let run = map_run(&nested, true);

    run.render_all(
        &mixed_layer_set(),
        &default_definitions()[..1],
        view_bounds(),
        fixed_now,
    )
    .unwrap();

    assert!(nested.join("Current_NY_None_Alert.png").exists());
}

fn image_header_ok(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}
