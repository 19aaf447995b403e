//! The per-hazard composition step.

use alert_common::{
    generated_at_line, AlertMapResult, Color, HazardDefinition, LayerKind, LayerSet, PlanarBounds,
    ResolvedHazard,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::select_hazards;
use crate::scene::{
    DrawStep, HAlign, LayerRole, Legend, LegendEntry, MapScene, PolygonStyle, SceneOutcome,
    TextAnnotation, TextBox, VAlign,
};

const LAND: Color = Color::rgb(0xee, 0xee, 0xee);
const REGION_LINE_WIDTH: f32 = 2.0;

/// Map text and colors. Everything here is the same for every hazard map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Title shown at the top of every map
    #[serde(default = "default_title")]
    pub title: String,

    /// Region name used in the "no alerts" labels
    #[serde(default = "default_region_name")]
    pub region_name: String,

    /// Spaces added on each side of the title to widen its box
    #[serde(default = "default_title_padding")]
    pub title_padding: usize,

    /// Plot background (water) color
    #[serde(default = "default_background")]
    pub background: Color,

    #[serde(default = "default_legend_title")]
    pub legend_title: String,
}

fn default_title() -> String {
    "New York State Weather Alerts".to_string()
}

fn default_region_name() -> String {
    "New York State".to_string()
}

fn default_title_padding() -> usize {
    12
}

fn default_background() -> Color {
    Color::rgb(0xa6, 0xce, 0xe3)
}

fn default_legend_title() -> String {
    "Alert Type".to_string()
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            region_name: default_region_name(),
            title_padding: default_title_padding(),
            background: default_background(),
            legend_title: default_legend_title(),
        }
    }
}

/// Builds one [`MapScene`] per hazard definition.
///
/// Holds no state between calls; every call re-reads the shared layers and
/// starts a fresh draw list.
#[derive(Debug, Clone, Default)]
pub struct HazardMapComposer {
    config: ComposerConfig,
}

impl HazardMapComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose the map for `definition`.
    ///
    /// The sentinel definition never touches the alert layer. Any other
    /// definition must resolve (all fields present, color valid) or the call
    /// fails with a definition error and no scene is produced.
    pub fn compose<'a>(
        &self,
        layers: &'a LayerSet,
        definition: &HazardDefinition,
        bounds: PlanarBounds,
        now: NaiveDateTime,
    ) -> AlertMapResult<MapScene<'a>> {
        definition.check_name()?;
        let mut steps = backdrop_steps(layers);
        let mut annotations = Vec::new();
        let mut legend = None;

        let outcome = if definition.is_sentinel() {
            annotations.push(self.notice(format!(
                "There are no active weather\nalerts for {}.",
                self.config.region_name
            )));
            SceneOutcome::NoActiveAlerts
        } else {
            let hazard = definition.resolve()?;
            let selected = select_hazards(&layers.hazards, &layers.target_region, &hazard);

            debug!(
                hazard = %hazard.name,
                phenomenon = %hazard.phenomenon,
                significance = %hazard.significance,
                matched = selected.len(),
                "Selected alert polygons"
            );

            if selected.is_empty() {
                annotations.push(self.notice(format!(
                    "There are no {}\nalerts for {}.",
                    hazard.name, self.config.region_name
                )));
                SceneOutcome::NoAlertsOfType
            } else {
                let count = selected.len();
                steps.push(DrawStep {
                    role: LayerRole::HazardFill,
                    geometries: selected.into_iter().map(|f| &f.geometry).collect(),
                    style: PolygonStyle::fill_only(hazard.color),
                });
                steps.extend(overlay_steps(layers));
                legend = Some(self.legend(&hazard));
                SceneOutcome::HazardsPresent { count }
            }
        };

        annotations.extend(self.title_block(now));

        Ok(MapScene {
            hazard_name: definition.name.clone(),
            background: self.config.background,
            view: bounds,
            steps,
            legend,
            annotations,
            outcome,
        })
    }

    /// Centered grey label on a white rounded box.
    fn notice(&self, text: String) -> TextAnnotation {
        TextAnnotation {
            text,
            x: 0.47,
            y: 0.425,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            font_size: 18.0,
            bold: false,
            color: Color::BLACK.with_alpha(0.5),
            text_box: Some(TextBox {
                fill: Color::WHITE,
                edge: None,
                padding: 0.4,
                rounded: true,
            }),
        }
    }

    fn legend(&self, hazard: &ResolvedHazard) -> Legend {
        Legend {
            title: self.config.legend_title.clone(),
            entries: vec![LegendEntry {
                label: hazard.legend_label(),
                color: hazard.color,
            }],
            anchor: (0.1, 0.075),
            font_size: 15.0,
            title_font_size: 18.0,
        }
    }

    /// Title drawn twice plus the generation time.
    ///
    /// The first copy has invisible text and an opaque box, the second
    /// visible text and an invisible box. The box is sized by the padded
    /// title and sits slightly lower than the text so it also frames the
    /// timestamp line below.
    fn title_block(&self, now: NaiveDateTime) -> [TextAnnotation; 3] {
        let pad = " ".repeat(self.config.title_padding);
        let title = format!("{pad}{}{pad}", self.config.title);

        let backdrop = TextAnnotation {
            text: title.clone(),
            x: 0.5,
            y: 0.96,
            h_align: HAlign::Center,
            v_align: VAlign::Top,
            font_size: 20.0,
            bold: true,
            color: Color::TRANSPARENT,
            text_box: Some(TextBox {
                fill: Color::WHITE,
                edge: Some(Color::BLACK),
                padding: 0.6,
                rounded: true,
            }),
        };

        let text = TextAnnotation {
            y: 0.97,
            color: Color::BLACK,
            text_box: Some(TextBox {
                fill: Color::TRANSPARENT,
                edge: None,
                padding: 0.6,
                rounded: true,
            }),
            ..backdrop.clone()
        };

        let timestamp = TextAnnotation {
            text: generated_at_line(now),
            x: 0.5,
            y: 0.915,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            font_size: 12.0,
            bold: false,
            color: Color::BLACK,
            text_box: None,
        };

        [backdrop, text, timestamp]
    }
}

fn backdrop_steps(layers: &LayerSet) -> Vec<DrawStep<'_>> {
    layers
        .backdrop()
        .into_iter()
        .filter_map(|layer| {
            let (role, style) = match layer.kind {
                LayerKind::World => (LayerRole::World, PolygonStyle::filled(LAND, Color::BLACK)),
                LayerKind::NeighborStates => {
                    (LayerRole::NeighborStates, PolygonStyle::filled(LAND, Color::BLACK))
                }
                LayerKind::Counties => (
                    LayerRole::Counties,
                    PolygonStyle::filled(Color::WHITE, Color::BLACK),
                ),
                LayerKind::TargetRegion => (
                    LayerRole::TargetRegion,
                    PolygonStyle::outline(Color::BLACK, REGION_LINE_WIDTH),
                ),
                LayerKind::Hazards => return None,
            };
            Some(DrawStep {
                role,
                geometries: layer.geometries.iter().collect(),
                style,
            })
        })
        .collect()
}

/// Outlines redrawn over the hazard fill so boundaries stay visible.
fn overlay_steps(layers: &LayerSet) -> [DrawStep<'_>; 2] {
    [
        DrawStep {
            role: LayerRole::CountiesOverlay,
            geometries: layers.counties.geometries.iter().collect(),
            style: PolygonStyle::outline(Color::BLACK, 1.0),
        },
        DrawStep {
            role: LayerRole::TargetRegionOverlay,
            geometries: layers.target_region.geometries.iter().collect(),
            style: PolygonStyle::outline(Color::BLACK, REGION_LINE_WIDTH),
        },
    ]
}
