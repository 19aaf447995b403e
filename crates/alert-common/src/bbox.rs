//! Bounding box types for the map view.

use serde::{Deserialize, Serialize};

/// A lon/lat box in degrees, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeographicBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check ordering and coordinate ranges.
    pub fn validate(&self) -> Result<(), String> {
        if !(-180.0..=180.0).contains(&self.min_lon) || !(-180.0..=180.0).contains(&self.max_lon) {
            return Err(format!(
                "longitude out of range: {} .. {}",
                self.min_lon, self.max_lon
            ));
        }
        if !(-90.0..=90.0).contains(&self.min_lat) || !(-90.0..=90.0).contains(&self.max_lat) {
            return Err(format!(
                "latitude out of range: {} .. {}",
                self.min_lat, self.max_lat
            ));
        }
        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err("min must be less than max on both axes".to_string());
        }
        Ok(())
    }
}

/// The map view extent in the planar coordinate system (meters).
///
/// Computed once per run and shared by every rendered map so that all
/// artifacts of a run frame exactly the same area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarBounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl PlanarBounds {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Build from two arbitrary corners, ordering each axis.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x_min: a.0.min(b.0),
            y_min: a.1.min(b.1),
            x_max: a.0.max(b.0),
            y_max: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn is_valid(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
            && self.width() > 0.0
            && self.height() > 0.0
    }
}
