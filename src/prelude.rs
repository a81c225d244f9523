//! Prelude module for common tileway types
//!
//! Re-exports the most commonly used types for easy importing with
//! `use tileway::prelude::*;`

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

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
