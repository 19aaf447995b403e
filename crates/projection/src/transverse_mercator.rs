//! Transverse Mercator projection on an ellipsoid.
//!
//! State plane zones that run north-south use this projection. The series
//! expansions follow Snyder, "Map Projections: A Working Manual" (USGS
//! Professional Paper 1395), eqs. 8-9 to 8-25, which stay well below a
//! millimeter of error within a few degrees of the central meridian.
//!
//! The projection parameters include:
//! - Latitude of origin (lat0) and central meridian (lon0)
//! - Scale factor on the central meridian (k0)
//! - False easting / northing in meters

use std::f64::consts::PI;

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    /// GRS 1980, the ellipsoid of NAD83.
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }
}

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    pub ellipsoid: Ellipsoid,
    /// e^2
    e2: f64,
    /// e'^2 = e^2 / (1 - e^2)
    ep2: f64,
    /// Meridian distance from the equator to lat0
    m0: f64,
}

impl TransverseMercator {
    /// Create a projection from parameters in degrees and meters.
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Self {
        let to_rad = PI / 180.0;
        let lat0 = lat0_deg * to_rad;
        let e2 = ellipsoid.e2();
        let ep2 = e2 / (1.0 - e2);

        let mut proj = Self {
            lon0: lon0_deg * to_rad,
            lat0,
            k0,
            false_easting,
            false_northing,
            ellipsoid,
            e2,
            ep2,
            m0: 0.0,
        };
        proj.m0 = proj.meridian_distance(lat0);
        proj
    }

    /// NAD83 / New York Central (EPSG:32116).
    ///
    /// - Latitude of origin: 40°N
    /// - Central meridian: 76°35'W
    /// - Scale: 0.9999375
    /// - False easting 250 km, no false northing
    pub fn ny_central() -> Self {
        Self::new(
            40.0,
            -(76.0 + 35.0 / 60.0),
            0.999_937_5,
            250_000.0,
            0.0,
            Ellipsoid::GRS80,
        )
    }

    /// Meridian distance from the equator to latitude `phi` (radians).
    fn meridian_distance(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        self.ellipsoid.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Convert geographic coordinates (degrees) to projected meters.
    ///
    /// Arguments are in x/y order: longitude first.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let phi = lat_deg * to_rad;

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon_deg * to_rad - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let a = self.ellipsoid.a;
        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let aa = dlon * cos_phi;
        let m = self.meridian_distance(phi);

        let a2 = aa * aa;
        let a3 = a2 * aa;
        let a4 = a3 * aa;
        let a5 = a4 * aa;
        let a6 = a5 * aa;

        let x = self.k0
            * n
            * (aa
                + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);

        let y = self.k0
            * (m - self.m0
                + n * tan_phi
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6
                            / 720.0));

        (x + self.false_easting, y + self.false_northing)
    }

    /// Convert projected meters back to geographic coordinates (degrees).
    ///
    /// Returns (lon, lat).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;
        let a = self.ellipsoid.a;
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        // Footpoint latitude
        let m = self.m0 + (y - self.false_northing) / self.k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let sqrt_1_e2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = a / w.sqrt();
        let r1 = a * (1.0 - e2) / w.powf(1.5);
        let d = (x - self.false_easting) / (n1 * self.k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos_phi1;

        (lon * to_deg, phi * to_deg)
    }
}
