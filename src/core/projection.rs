//! Web-Mercator tile projection.
//!
//! `TileAlgorithm` converts between geographic coordinates, projected pixel
//! coordinates, and tile indices for one zoom level of the tile pyramid. All
//! operations are pure and safe for unsynchronized concurrent use.
//!
//! Zoom levels are non-negative by construction (`u8`); callers pick a sane
//! upper bound for their provider (slippy-map servers top out around 19-23).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::constants::{EARTH_EQUATOR_RADIUS, METERS_PER_INCH, TILE_SIZE};
use crate::core::geo::{clip_lat, GeoCoordinate, PixelPoint, TileKey};

/// Tile-mapping rule used by a provider. The two variants share the
/// spherical Web-Mercator math; Bing-style providers additionally address
/// tiles by quadkey (see [`tile_to_quadkey`]) instead of (x, y, z) paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileAlgorithm {
    Standard,
    Bing,
}

impl TileAlgorithm {
    /// Width (and height) of the world map in pixels at `zoom`:
    /// `256 * 2^zoom`.
    pub fn map_size_pixels(&self, zoom: u8) -> f64 {
        TILE_SIZE as f64 * 2f64.powi(zoom as i32)
    }

    /// Forward Web-Mercator projection into the pixel space of `zoom`.
    /// Input is clipped to the valid range first; both output axes are
    /// clamped to `[0, map_size - 1]`.
    pub fn geo_to_pixel(&self, coord: GeoCoordinate, zoom: u8) -> PixelPoint {
        let c = coord.clipped();
        let x = (c.lon + 180.0) / 360.0;
        let sin_lat = c.lat.to_radians().sin();
        let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

        let size = self.map_size_pixels(zoom);
        PixelPoint::new(
            (x * size).clamp(0.0, size - 1.0),
            (y * size).clamp(0.0, size - 1.0),
        )
    }

    /// Inverse projection from pixel space back to degrees. Exact inverse of
    /// [`geo_to_pixel`](Self::geo_to_pixel) away from the clamped map edges.
    pub fn pixel_to_geo(&self, pixel: PixelPoint, zoom: u8) -> GeoCoordinate {
        let size = self.map_size_pixels(zoom);
        let x = pixel.x / size;
        let y = pixel.y / size;

        let lon = x * 360.0 - 180.0;
        let lat = ((0.5 - y) * 2.0 * PI).tanh().asin().to_degrees();
        GeoCoordinate::new(lon, lat)
    }

    /// Index of the tile containing `coord` at `zoom`.
    pub fn geo_to_tile(&self, coord: GeoCoordinate, zoom: u8) -> TileKey {
        let pixel = self.geo_to_pixel(coord, zoom);
        TileKey::new(
            (pixel.x / TILE_SIZE as f64).floor() as u32,
            (pixel.y / TILE_SIZE as f64).floor() as u32,
            zoom,
        )
    }

    /// Geographic coordinate of the tile's north-west corner.
    pub fn tile_to_geo(&self, tile: TileKey) -> GeoCoordinate {
        self.pixel_to_geo(
            PixelPoint::new(
                tile.x as f64 * TILE_SIZE as f64,
                tile.y as f64 * TILE_SIZE as f64,
            ),
            tile.z,
        )
    }

    /// Ground resolution in meters per pixel at `lat` and `zoom`.
    pub fn ground_resolution(&self, lat: f64, zoom: u8) -> f64 {
        clip_lat(lat).to_radians().cos() * 2.0 * PI * EARTH_EQUATOR_RADIUS
            / self.map_size_pixels(zoom)
    }

    /// Map scale denominator (1 : N) for a screen of `screen_dpi`.
    pub fn map_scale(&self, lat: f64, zoom: u8, screen_dpi: u32) -> f64 {
        self.ground_resolution(lat, zoom) * screen_dpi as f64 / METERS_PER_INCH
    }
}

/// Encodes a tile index as a Bing-style quadkey: one base-4 digit per zoom
/// level, most significant bit first, with the x bit worth 1 and the y bit
/// worth 2.
pub fn tile_to_quadkey(tile: TileKey) -> String {
    let mut quadkey = String::with_capacity(tile.z as usize);
    for i in (1..=tile.z).rev() {
        let mask = 1u32 << (i - 1);
        let mut digit = b'0';
        if tile.x & mask != 0 {
            digit += 1;
        }
        if tile.y & mask != 0 {
            digit += 2;
        }
        quadkey.push(digit as char);
    }
    quadkey
}

/// Decodes a quadkey back into a tile index. Unrecognized characters leave
/// the corresponding bits unset rather than erroring.
pub fn quadkey_to_tile(quadkey: &str) -> TileKey {
    let z = quadkey.len() as u8;
    let mut x = 0u32;
    let mut y = 0u32;
    for (pos, ch) in quadkey.chars().enumerate() {
        let mask = 1u32 << (z as usize - pos - 1);
        match ch {
            '0' => {}
            '1' => x |= mask,
            '2' => y |= mask,
            '3' => {
                x |= mask;
                y |= mask;
            }
            _ => {}
        }
    }
    TileKey::new(x, y, z)
}
