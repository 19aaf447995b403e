//! Coordinate Reference System codes and detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes the pipeline can read from or project into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// NAD83 / New York Central (Transverse Mercator, meters)
    Epsg32116,
}

impl CrsCode {
    /// Parse a CRS string such as "EPSG:4326" or "epsg:32116".
    ///
    /// "CRS:84" is accepted as an alias of EPSG:4326.
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:32116" => Ok(CrsCode::Epsg32116),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }

    /// Guess the CRS of a shapefile from the WKT in its `.prj` sidecar.
    ///
    /// Only the systems listed in [`CrsCode`] are recognized. Returns `None`
    /// for anything else so the caller can decide on a fallback.
    pub fn detect_from_wkt(wkt: &str) -> Option<Self> {
        let upper = wkt.to_uppercase();

        if upper.starts_with("PROJCS") {
            let is_tm = upper.contains("TRANSVERSE_MERCATOR");
            let is_ny_central = upper.contains("NEW_YORK_CENTRAL")
                || upper.contains("NEW YORK CENTRAL")
                || upper.contains("-76.58333");
            if is_tm && is_ny_central {
                return Some(CrsCode::Epsg32116);
            }
            return None;
        }

        if upper.starts_with("GEOGCS") {
            if upper.contains("NAD83")
                || upper.contains("NAD_1983")
                || upper.contains("NORTH_AMERICAN_1983")
            {
                return Some(CrsCode::Epsg4269);
            }
            return Some(CrsCode::Epsg4326);
        }

        None
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg32116 => "EPSG:32116",
        };
        write!(f, "{}", code)
    }
}

impl TryFrom<String> for CrsCode {
    type Error = CrsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CrsCode::parse(&value)
    }
}

impl From<CrsCode> for String {
    fn from(code: CrsCode) -> Self {
        code.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::parse("epsg:32116").unwrap(), CrsCode::Epsg32116);
        assert_eq!(CrsCode::parse("CRS:84").unwrap(), CrsCode::Epsg4326);
        assert!(CrsCode::parse("EPSG:3857").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for code in [CrsCode::Epsg4326, CrsCode::Epsg4269, CrsCode::Epsg32116] {
            assert_eq!(CrsCode::parse(&code.to_string()).unwrap(), code);
        }
    }

    #[test]
    fn test_detect_geographic_wkt() {
        let wgs84 = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(CrsCode::detect_from_wkt(wgs84), Some(CrsCode::Epsg4326));

        let nad83 = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]]]"#;
        assert_eq!(CrsCode::detect_from_wkt(nad83), Some(CrsCode::Epsg4269));
    }

    #[test]
    fn test_detect_ny_central_wkt() {
        let wkt = r#"PROJCS["NAD_1983_StatePlane_New_York_Central_FIPS_3102_Meters",GEOGCS["GCS_North_American_1983"],PROJECTION["Transverse_Mercator"],PARAMETER["Central_Meridian",-76.58333333333333]]"#;
        assert_eq!(CrsCode::detect_from_wkt(wkt), Some(CrsCode::Epsg32116));
    }

    #[test]
    fn test_detect_unknown_projection() {
        let wkt = r#"PROJCS["WGS_1984_Web_Mercator",PROJECTION["Mercator_Auxiliary_Sphere"]]"#;
        assert_eq!(CrsCode::detect_from_wkt(wkt), None);
    }
}
