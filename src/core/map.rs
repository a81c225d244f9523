use std::sync::Arc;

use fxhash::FxHashSet;

use crate::core::config::MapEngineConfig;
use crate::core::geo::TileKey;
use crate::core::viewport::Viewport;
use crate::tiles::cache::MemoryCache;
use crate::tiles::disk::DiskCache;
use crate::tiles::loader::{TileEvent, TileLoader};
use crate::tiles::source::TileSource;

/// Notification surfaced to the embedding UI layer.
#[derive(Debug, Clone)]
pub enum MapEvent {
    /// Raster bytes for `key` are ready to draw.
    TileReady { key: TileKey, bytes: Arc<Vec<u8>> },
    /// Loading `key` failed terminally; drawing a placeholder (or nothing)
    /// is the renderer's call.
    TileFailed { key: TileKey, reason: String },
}

/// Per-view tile engine: resolves the viewport's tiles through
/// memory cache, then disk cache, then the network loader.
///
/// Each engine exclusively owns one memory cache, one disk cache, and one
/// loader; create one engine per map view. The engine is polled from a
/// single thread (typically the UI thread on every redraw tick) while the
/// loader completes requests on the tokio runtime in any order.
pub struct MapEngine {
    viewport: Viewport,
    source: TileSource,
    memory: MemoryCache,
    disk: DiskCache,
    loader: TileLoader,
    /// Keys already handed to the loader, so repeated orchestration passes
    /// never re-issue a load for the same tile.
    requested: FxHashSet<TileKey>,
    needs_redraw: bool,
}

impl MapEngine {
    pub fn new(config: MapEngineConfig) -> Self {
        let loader = TileLoader::new(config.source.clone(), config.loader);
        Self {
            viewport: config.viewport,
            source: config.source,
            memory: MemoryCache::new(config.memory_capacity),
            disk: DiskCache::new(config.cache_dir),
            loader,
            requested: FxHashSet::default(),
            needs_redraw: true,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.needs_redraw = true;
    }

    pub fn source(&self) -> &TileSource {
        &self.source
    }

    pub fn memory_cache(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn disk_cache(&self) -> &DiskCache {
        &self.disk
    }

    pub fn loader(&self) -> &TileLoader {
        &self.loader
    }

    /// Resolve every tile visible in the current viewport and return the
    /// ones available right now. Memory hits return immediately; disk hits
    /// are promoted into the memory cache; everything else is requested
    /// from the loader exactly once per pending cycle.
    pub fn update(&mut self) -> Vec<(TileKey, Arc<Vec<u8>>)> {
        let mut ready = Vec::new();
        for key in self.viewport.visible_tiles(self.source.algorithm()) {
            if let Some(bytes) = self.memory.get(&key) {
                ready.push((key, bytes));
                continue;
            }
            if let Some(bytes) = self.disk.load_tile(key) {
                let bytes = Arc::new(bytes);
                self.memory.insert(key, bytes.clone());
                ready.push((key, bytes));
                continue;
            }
            if self.requested.insert(key) {
                self.loader.request_tile(key);
            }
        }
        ready
    }

    /// Drain loader completions: write successes through both caches and
    /// surface one event per terminal outcome. Tiles complete in any order
    /// across keys.
    pub fn poll(&mut self) -> Vec<MapEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.loader.events().try_recv() {
            match event {
                TileEvent::Loaded { key, bytes } => {
                    self.memory.insert(key, bytes.clone());
                    self.disk.save_tile(key, &bytes);
                    self.requested.remove(&key);
                    self.needs_redraw = true;
                    events.push(MapEvent::TileReady { key, bytes });
                }
                TileEvent::Failed { key, reason } => {
                    self.requested.remove(&key);
                    events.push(MapEvent::TileFailed { key, reason });
                }
            }
        }
        events
    }

    /// Whether anything changed since the last redraw; reading resets the
    /// flag.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Switch tile provider (style change). Tiles tied to the old source
    /// are invalidated: in-flight requests are abandoned and the memory
    /// cache is cleared. Pass `clear_disk` when the disk root is not shared
    /// across styles.
    pub fn set_source(&mut self, source: TileSource, clear_disk: bool) {
        log::info!("switching tile source to {}", source.url_template());
        self.loader.set_source(source.clone());
        self.source = source;
        self.requested.clear();
        self.memory.clear();
        if clear_disk {
            self.disk.clear();
        }
        self.needs_redraw = true;
    }
}
