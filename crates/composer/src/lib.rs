//! Hazard map composition.
//!
//! Turns the shared layer set plus one hazard definition into a
//! [`MapScene`]: which polygons are drawn, in what order and style, with
//! which legend and labels. Rasterization lives in the `renderer` crate.

pub mod compose;
pub mod filter;
pub mod naming;
pub mod scene;

pub use compose::{ComposerConfig, HazardMapComposer};
pub use filter::{features_in_region, matching_features, select_hazards};
pub use naming::artifact_file_name;
pub use scene::{
    DrawStep, HAlign, LayerRole, Legend, LegendEntry, MapScene, PolygonStyle, SceneOutcome,
    TextAnnotation, TextBox, VAlign,
};
