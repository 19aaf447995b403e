//! Coordinate reference system transformations.
//!
//! Implements the map projection from scratch; the only planar target is
//! NAD83 / New York Central (EPSG:32116).

pub mod transform;
pub mod transverse_mercator;

pub use transform::{CrsNormalizer, ProjectionError};
pub use transverse_mercator::{Ellipsoid, TransverseMercator};
