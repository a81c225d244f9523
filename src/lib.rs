//! # Tileway
//!
//! A slippy-map tile engine: Web-Mercator coordinate projection, a two-tier
//! tile cache (memory + disk), and a concurrent tile loader with per-key
//! request deduplication, timeout, and bounded retry.
//!
//! The crate deliberately stops at the tile-serving boundary. It computes
//! which tiles a viewport needs, resolves them through the caches and the
//! network, and surfaces tile-ready / tile-failed events; drawing those tiles
//! to a surface is the embedding application's job.
//!
//! ```no_run
//! use tileway::{MapEngine, MapEngineConfig, GeoCoordinate, Viewport};
//!
//! # #[tokio::main] async fn main() {
//! let mut engine = MapEngine::new(MapEngineConfig::default());
//! engine.set_viewport(Viewport::new(
//!     GeoCoordinate::new(116.4074, 39.9042),
//!     12.0,
//!     1024,
//!     768,
//! ));
//! let ready = engine.update();
//! for event in engine.poll() {
//!     // hand TileReady bytes to the renderer
//! }
//! # }
//! ```

pub mod core;
pub mod prelude;
pub mod tiles;

// Re-export public API
pub use crate::core::{
    config::{MapEngineConfig, TileLoaderConfig},
    geo::{GeoCoordinate, PixelPoint, TileKey},
    map::{MapEngine, MapEvent},
    projection::TileAlgorithm,
    viewport::Viewport,
};

pub use crate::tiles::{
    cache::MemoryCache,
    disk::DiskCache,
    loader::{TileEvent, TileLoader},
    source::TileSource,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid image data: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,
}

impl MapError {
    /// A transport-level failure may be retried; a decode failure is
    /// terminal, since retrying cannot fix malformed server data.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, MapError::Decode(_))
    }
}

/// Error type alias for convenience
pub type Error = MapError;
