//! Common types shared across the alert-mapping crates.

pub mod bbox;
pub mod color;
pub mod crs;
pub mod error;
pub mod feature;
pub mod hazard;
pub mod time;

pub use bbox::{GeographicBox, PlanarBounds};
pub use color::Color;
pub use crs::CrsCode;
pub use error::{AlertMapError, AlertMapResult, FailureScope};
pub use feature::{AlertFeature, BoundaryLayer, LayerKind, LayerSet};
pub use hazard::{HazardDefinition, ResolvedHazard};
pub use time::generated_at_line;
