use serde::{Deserialize, Serialize};

use crate::core::constants::TILE_SIZE;
use crate::core::geo::{GeoCoordinate, TileKey};
use crate::core::projection::TileAlgorithm;

/// The current view of the map: center, zoom, and pixel dimensions.
///
/// Zoom is fractional to let the UI animate smoothly between levels; tile
/// math always uses the floored level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: GeoCoordinate,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(center: GeoCoordinate, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// Integer zoom level the tile pyramid is addressed at.
    pub fn tile_zoom(&self) -> u8 {
        self.zoom.floor().max(0.0) as u8
    }

    /// All tile keys covering the visible area at the current zoom, in
    /// row-major order, axis-clamped to `[0, 2^z - 1]`.
    pub fn visible_tiles(&self, algorithm: TileAlgorithm) -> Vec<TileKey> {
        let zoom = self.tile_zoom();
        let size = algorithm.map_size_pixels(zoom);
        let center = algorithm.geo_to_pixel(self.center, zoom);

        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let min_x = (center.x - half_w).max(0.0);
        let max_x = (center.x + half_w).min(size - 1.0);
        let min_y = (center.y - half_h).max(0.0);
        let max_y = (center.y + half_h).min(size - 1.0);

        let tile_size = TILE_SIZE as f64;
        let max_index = (1u32 << zoom) - 1;
        let first_col = ((min_x / tile_size).floor() as u32).min(max_index);
        let last_col = ((max_x / tile_size).floor() as u32).min(max_index);
        let first_row = ((min_y / tile_size).floor() as u32).min(max_index);
        let last_row = ((max_y / tile_size).floor() as u32).min(max_index);

        let mut tiles =
            Vec::with_capacity(((last_col - first_col + 1) * (last_row - first_row + 1)) as usize);
        for y in first_row..=last_row {
            for x in first_col..=last_col {
                tiles.push(TileKey::new(x, y, zoom));
            }
        }
        tiles
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(GeoCoordinate::default(), 0.0, 256, 256)
    }
}
