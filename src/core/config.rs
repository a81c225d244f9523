//! Configuration for the tile loader and the map engine.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::viewport::Viewport;
use crate::tiles::source::TileSource;

/// Tuning knobs for [`TileLoader`](crate::tiles::loader::TileLoader).
#[derive(Debug, Clone)]
pub struct TileLoaderConfig {
    /// Total attempts per tile before the failure is terminal.
    pub max_retries: u32,
    /// Abort an in-flight network operation after this long; counts as a
    /// retryable failure.
    pub timeout: Duration,
    /// Delay between attempts for the same tile.
    pub retry_delay: Duration,
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(5),
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl TileLoaderConfig {
    /// Short timeouts and delays so failure paths finish quickly in tests.
    pub fn for_testing() -> Self {
        Self {
            max_retries: 2,
            timeout: Duration::from_millis(500),
            retry_delay: Duration::from_millis(20),
        }
    }
}

/// Construction options for [`MapEngine`](crate::core::map::MapEngine).
///
/// Every engine instance owns its own caches and loader; nothing here is
/// shared process-wide.
#[derive(Debug, Clone)]
pub struct MapEngineConfig {
    /// Tile provider the engine starts with.
    pub source: TileSource,
    /// Memory-cache capacity in estimated bytes of decoded tile data.
    pub memory_capacity: usize,
    /// Root directory of the on-disk tile store.
    pub cache_dir: PathBuf,
    pub loader: TileLoaderConfig,
    pub viewport: Viewport,
}

impl Default for MapEngineConfig {
    fn default() -> Self {
        Self {
            source: TileSource::openstreetmap(),
            memory_capacity: 100 * 1024 * 1024,
            cache_dir: std::env::temp_dir().join("tileway-tiles"),
            loader: TileLoaderConfig::default(),
            viewport: Viewport::default(),
        }
    }
}
