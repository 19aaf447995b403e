//! Rasterizer tests on synthetic scenes.
//!
//! Rendering runs without fonts so results do not depend on the host.

use alert_common::{Color, HazardDefinition, PlanarBounds};
use composer::{
    ComposerConfig, DrawStep, HazardMapComposer, LayerRole, MapScene, PolygonStyle, SceneOutcome,
};
use image::GenericImageView;
use renderer::{FontSet, PlotArea, RasterOptions, SceneRasterizer};
use test_utils::{fixed_now, mixed_layer_set, square, view_bounds};

const WATER: Color = Color::rgb(0xa6, 0xce, 0xe3);
const TURQUOISE: Color = Color::rgb(0x40, 0xe0, 0xd0);

fn rasterizer() -> SceneRasterizer {
    SceneRasterizer::with_fonts(RasterOptions::default(), FontSet::empty())
}

fn empty_scene<'a>(view: PlanarBounds) -> MapScene<'a> {
    MapScene {
        hazard_name: "Test".to_string(),
        background: WATER,
        view,
        steps: Vec::new(),
        legend: None,
        annotations: Vec::new(),
        outcome: SceneOutcome::NoActiveAlerts,
    }
}

fn pixel_at(image: &image::RgbaImage, x: f32, y: f32) -> [u8; 4] {
    image.get_pixel(x.round() as u32, y.round() as u32).0
}

#[test]
fn test_png_has_configured_size() {
    let png = rasterizer().render(&empty_scene(view_bounds())).unwrap();

    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.dimensions(), (1000, 1000));
}

#[test]
fn test_custom_size() {
    let options = RasterOptions {
        width: 400,
        height: 300,
        ..RasterOptions::default()
    };
    let raster = SceneRasterizer::with_fonts(options, FontSet::empty());
    let image = raster.rasterize(&empty_scene(view_bounds())).unwrap();
    assert_eq!(image.dimensions(), (400, 300));
}

#[test]
fn test_open_water_is_background() {
    let view = view_bounds();
    let image = rasterizer().rasterize(&empty_scene(view)).unwrap();
    let plot = PlotArea::fit(1000, 1000, view);

    let (x, y) = plot.relative(0.5, 0.5);
    assert_eq!(pixel_at(&image, x, y), WATER.to_array());

    // Outside the plot area the figure stays white
    assert_eq!(pixel_at(&image, 10.0, 10.0), [255, 255, 255, 255]);
}

#[test]
fn test_hazard_fill_color_inside_polygon() {
    let view = view_bounds();
    let alert = square(100.0, 100.0, 200.0);
    let mut scene = empty_scene(view);
    scene.steps.push(DrawStep {
        role: LayerRole::HazardFill,
        geometries: vec![&alert],
        style: PolygonStyle::fill_only(TURQUOISE),
    });

    let image = rasterizer().rasterize(&scene).unwrap();
    let plot = PlotArea::fit(1000, 1000, view);

    let (x, y) = plot.project(200.0, 200.0);
    assert_eq!(pixel_at(&image, x, y), TURQUOISE.to_array());

    let (x, y) = plot.project(600.0, 600.0);
    assert_eq!(pixel_at(&image, x, y), WATER.to_array());
}

#[test]
fn test_holes_are_not_filled() {
    let view = view_bounds();
    let donut = test_utils::square_with_hole(0.0, 0.0, 1000.0, 200.0);
    let mut scene = empty_scene(view);
    scene.steps.push(DrawStep {
        role: LayerRole::Counties,
        geometries: vec![&donut],
        style: PolygonStyle::fill_only(Color::WHITE),
    });

    let image = rasterizer().rasterize(&scene).unwrap();
    let plot = PlotArea::fit(1000, 1000, view);

    let (x, y) = plot.project(500.0, 500.0);
    assert_eq!(pixel_at(&image, x, y), WATER.to_array());
    let (x, y) = plot.project(100.0, 100.0);
    assert_eq!(pixel_at(&image, x, y), [255, 255, 255, 255]);
}

#[test]
fn test_fill_is_clipped_to_plot() {
    let view = PlanarBounds::new(0.0, 0.0, 100.0, 100.0);
    let huge = square(-10_000.0, -10_000.0, 20_000.0);
    let mut scene = empty_scene(view);
    scene.steps.push(DrawStep {
        role: LayerRole::World,
        geometries: vec![&huge],
        style: PolygonStyle::fill_only(TURQUOISE),
    });

    let image = rasterizer().rasterize(&scene).unwrap();
    assert_eq!(pixel_at(&image, 10.0, 10.0), [255, 255, 255, 255]);
    assert_eq!(pixel_at(&image, 500.0, 500.0), TURQUOISE.to_array());
}

#[test]
fn test_composed_scene_renders() {
    let layers = mixed_layer_set();
    let composer = HazardMapComposer::new(ComposerConfig::default());
    let def = HazardDefinition::new("Rip Current", "RP", "S", "Statement", "#40E0D0");
    let scene = composer
        .compose(&layers, &def, view_bounds(), fixed_now())
        .unwrap();

    let image = rasterizer().rasterize(&scene).unwrap();
    let plot = PlotArea::fit(1000, 1000, view_bounds());

    // Center of the matching alert square
    let (x, y) = plot.project(200.0, 200.0);
    assert_eq!(pixel_at(&image, x, y), TURQUOISE.to_array());

    // Inside a county away from alerts
    let (x, y) = plot.project(750.0, 250.0);
    assert_eq!(pixel_at(&image, x, y), [255, 255, 255, 255]);
}

#[test]
fn test_sentinel_scene_renders_png() {
    let layers = mixed_layer_set();
    let composer = HazardMapComposer::new(ComposerConfig::default());
    let scene = composer
        .compose(
            &layers,
            &HazardDefinition::sentinel("None"),
            view_bounds(),
            fixed_now(),
        )
        .unwrap();

    let png = rasterizer().render(&scene).unwrap();
    assert!(image::load_from_memory(&png).is_ok());
}

#[test]
fn test_degenerate_view_rejected() {
    let scene = empty_scene(PlanarBounds::new(0.0, 0.0, 0.0, 10.0));
    assert!(rasterizer().render(&scene).is_err());
}

#[test]
fn test_render_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.png");
    let png = rasterizer().render(&empty_scene(view_bounds())).unwrap();
    std::fs::write(&path, &png).unwrap();

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.width(), 1000);
}
