//! Map rasterization.
//!
//! Turns a [`composer::MapScene`] into PNG bytes:
//! - Polygon fills and outlines with tiny-skia
//! - Text boxes, legend and labels (rusttype glyphs via imageproc)
//! - Indexed or RGBA PNG encoding

pub mod error;
pub mod font;
pub mod layout;
pub mod png;
pub mod raster;
mod text;

pub use error::RenderError;
pub use font::FontSet;
pub use layout::PlotArea;
pub use raster::{RasterOptions, SceneRasterizer};
