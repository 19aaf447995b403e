//! Renderer-agnostic description of one map.
//!
//! Positions of text and legend are relative to the plot area: (0, 0) is its
//! lower-left corner and (1, 1) its upper-right. Font sizes and line widths
//! are in points.

use alert_common::{Color, PlanarBounds};
use geo::MultiPolygon;

/// What a draw step paints. Steps are painted in order, each over the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    World,
    NeighborStates,
    Counties,
    TargetRegion,
    /// Matching alert polygons
    HazardFill,
    /// County lines redrawn over the hazard fill
    CountiesOverlay,
    /// Region outline redrawn over the hazard fill
    TargetRegionOverlay,
}

impl LayerRole {
    /// Backdrop draw order shared by every map.
    pub const BACKDROP: [LayerRole; 4] = [
        LayerRole::World,
        LayerRole::NeighborStates,
        LayerRole::Counties,
        LayerRole::TargetRegion,
    ];

    /// Full draw order of a map that shows hazards.
    pub const WITH_HAZARDS: [LayerRole; 7] = [
        LayerRole::World,
        LayerRole::NeighborStates,
        LayerRole::Counties,
        LayerRole::TargetRegion,
        LayerRole::HazardFill,
        LayerRole::CountiesOverlay,
        LayerRole::TargetRegionOverlay,
    ];
}

/// Fill and outline of the polygons in one draw step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonStyle {
    pub fill: Option<Color>,
    pub edge: Option<Color>,
    pub line_width: f32,
}

impl PolygonStyle {
    pub fn filled(fill: Color, edge: Color) -> Self {
        Self {
            fill: Some(fill),
            edge: Some(edge),
            line_width: 1.0,
        }
    }

    pub fn outline(edge: Color, line_width: f32) -> Self {
        Self {
            fill: None,
            edge: Some(edge),
            line_width,
        }
    }

    pub fn fill_only(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            edge: None,
            line_width: 0.0,
        }
    }
}

/// One layer painted onto the map. Geometries are borrowed from the layer set.
#[derive(Debug, Clone)]
pub struct DrawStep<'a> {
    pub role: LayerRole,
    pub geometries: Vec<&'a MultiPolygon<f64>>,
    pub style: PolygonStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Box drawn behind a text annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub fill: Color,
    pub edge: Option<Color>,
    /// Padding around the text, in multiples of the font size
    pub padding: f32,
    pub rounded: bool,
}

/// A text label anchored at a plot-relative position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub font_size: f32,
    pub bold: bool,
    pub color: Color,
    pub text_box: Option<TextBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

/// Legend box; `anchor` is its lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
    pub anchor: (f32, f32),
    pub font_size: f32,
    pub title_font_size: f32,
}

/// Which rendering branch produced the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneOutcome {
    /// The sentinel definition: a generic "no active alerts" map
    NoActiveAlerts,
    /// No matching alert inside the region
    NoAlertsOfType,
    /// At least one matching alert was drawn
    HazardsPresent { count: usize },
}

/// A fully composed map, ready to rasterize.
#[derive(Debug, Clone)]
pub struct MapScene<'a> {
    /// Display name of the hazard definition this map is for
    pub hazard_name: String,
    /// Water/background color of the plot area
    pub background: Color,
    /// View extent; identical for every map of a run
    pub view: PlanarBounds,
    pub steps: Vec<DrawStep<'a>>,
    pub legend: Option<Legend>,
    pub annotations: Vec<TextAnnotation>,
    pub outcome: SceneOutcome,
}

impl<'a> MapScene<'a> {
    /// Draw order of this scene.
    pub fn roles(&self) -> Vec<LayerRole> {
        self.steps.iter().map(|s| s.role).collect()
    }

    pub fn step(&self, role: LayerRole) -> Option<&DrawStep<'a>> {
        self.steps.iter().find(|s| s.role == role)
    }

    /// Number of alert polygons filled on this map.
    pub fn hazard_count(&self) -> usize {
        self.step(LayerRole::HazardFill)
            .map_or(0, |s| s.geometries.len())
    }
}
