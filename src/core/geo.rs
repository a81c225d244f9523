use serde::{Deserialize, Serialize};

use crate::core::constants::{
    EARTH_EQUATOR_RADIUS, EARTH_MEAN_RADIUS, EARTH_POLAR_RADIUS, MAX_LATITUDE, MAX_LONGITUDE,
    MIN_LATITUDE, MIN_LONGITUDE,
};

/// Clamps a longitude to [-180, 180]. Out-of-range input is clipped, not
/// normalized modulo 360.
pub fn clip_lon(lon: f64) -> f64 {
    lon.clamp(MIN_LONGITUDE, MAX_LONGITUDE)
}

/// Clamps a latitude to the Web-Mercator validity band.
pub fn clip_lat(lat: f64) -> f64 {
    lat.clamp(MIN_LATITUDE, MAX_LATITUDE)
}

/// A geographical coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lon: f64,
    pub lat: f64,
}

impl GeoCoordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns the coordinate clamped to the projectable range.
    pub fn clipped(&self) -> Self {
        Self {
            lon: clip_lon(self.lon),
            lat: clip_lat(self.lat),
        }
    }

    /// Fast great-circle distance in meters using the Haversine formula over
    /// a sphere of mean earth radius. Good to ~0.5% anywhere on the globe.
    pub fn haversine_distance(&self, other: &GeoCoordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_MEAN_RADIUS * c
    }

    /// High-precision geodesic distance in meters on the WGS84 ellipsoid
    /// (Vincenty's inverse formula). Returns 0.0 for coincident points and
    /// for the pathological near-antipodal pairs where the iteration does
    /// not converge within 100 rounds.
    pub fn vincenty_distance(&self, other: &GeoCoordinate) -> f64 {
        const MAX_ITERATIONS: usize = 100;
        const TOLERANCE: f64 = 1e-12;

        let a = EARTH_EQUATOR_RADIUS;
        let b = EARTH_POLAR_RADIUS;
        let f = (a - b) / a;

        let l = (other.lon - self.lon).to_radians();
        let u1 = ((1.0 - f) * self.lat.to_radians().tan()).atan();
        let u2 = ((1.0 - f) * other.lat.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        for _ in 0..MAX_ITERATIONS {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
                + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
            if sin_sigma == 0.0 {
                // Coincident points
                return 0.0;
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // Both points on the equator make cos²α zero
            let cos_2sigma_m = if cos_sq_alpha == 0.0 {
                0.0
            } else {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let lambda_prev = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
            if (lambda - lambda_prev).abs() < TOLERANCE {
                let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
                let big_a =
                    1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
                let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
                let delta_sigma = big_b
                    * sin_sigma
                    * (cos_2sigma_m
                        + big_b / 4.0
                            * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                                - big_b / 6.0
                                    * cos_2sigma_m
                                    * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                    * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
                return b * big_a * (sigma - delta_sigma);
            }
        }

        // Did not converge (nearly antipodal points)
        0.0
    }

    /// Moves the coordinate north by `meters` (south when negative), result
    /// clipped to the valid latitude band.
    pub fn offset_lat(&self, meters: f64) -> Self {
        let lat = self.lat + (meters / EARTH_MEAN_RADIUS).to_degrees();
        Self::new(self.lon, clip_lat(lat))
    }

    /// Moves the coordinate east by `meters` (west when negative) along its
    /// own parallel, result clipped to [-180, 180].
    pub fn offset_lon(&self, meters: f64) -> Self {
        let lon =
            self.lon + (meters / (EARTH_MEAN_RADIUS * self.lat.to_radians().cos())).to_degrees();
        Self::new(clip_lon(lon), self.lat)
    }
}

impl Default for GeoCoordinate {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A point in the projected pixel space of a given zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn floor(&self) -> PixelPoint {
        PixelPoint::new(self.x.floor(), self.y.floor())
    }
}

/// Identifies one tile of the slippy-map pyramid as (x, y, zoom).
///
/// Valid keys satisfy `x, y < 2^z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileKey {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    pub fn is_valid(&self) -> bool {
        let max_coord = 1u32 << self.z.min(31);
        self.x < max_coord && self.y < max_coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_clamps_without_wrapping() {
        assert_eq!(clip_lon(190.0), 180.0);
        assert_eq!(clip_lon(-200.0), -180.0);
        assert_eq!(clip_lon(12.5), 12.5);
        assert_eq!(clip_lat(90.0), MAX_LATITUDE);
        assert_eq!(clip_lat(-90.0), MIN_LATITUDE);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        let north = GeoCoordinate::new(0.0, 1.0);
        let d = origin.haversine_distance(&north);
        // 2*pi*R_mean / 360
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = GeoCoordinate::new(116.4074, 39.9042);
        let b = GeoCoordinate::new(121.4737, 31.2304);
        assert!((a.haversine_distance(&b) - b.haversine_distance(&a)).abs() < 1e-6);
    }

    #[test]
    fn vincenty_one_degree_along_the_equator() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        let east = GeoCoordinate::new(1.0, 0.0);
        let d = origin.vincenty_distance(&east);
        // One degree of the equatorial circle: 2*pi*a / 360
        assert!((d - 111_319.49).abs() < 0.5, "got {d}");
    }

    #[test]
    fn vincenty_one_degree_of_meridian() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        let north = GeoCoordinate::new(0.0, 1.0);
        let d = origin.vincenty_distance(&north);
        // WGS84 meridian arc from the equator to 1N
        assert!((d - 110_574.39).abs() < 0.5, "got {d}");
    }

    #[test]
    fn vincenty_coincident_points_are_zero() {
        let p = GeoCoordinate::new(12.34, 56.78);
        assert_eq!(p.vincenty_distance(&p), 0.0);
    }

    #[test]
    fn offsets_move_by_ground_distance() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        let north = origin.offset_lat(111_195.0);
        assert!((north.lat - 1.0).abs() < 1e-3, "got {}", north.lat);
        let east = origin.offset_lon(111_195.0);
        assert!((east.lon - 1.0).abs() < 1e-3, "got {}", east.lon);
        // Offsets clip rather than wrap
        let clipped = GeoCoordinate::new(179.9, 0.0).offset_lon(1_000_000.0);
        assert_eq!(clipped.lon, 180.0);
    }

    #[test]
    fn tile_key_validity() {
        assert!(TileKey::new(0, 0, 0).is_valid());
        assert!(TileKey::new(3371, 1552, 12).is_valid());
        assert!(!TileKey::new(4096, 0, 12).is_valid());
    }
}
