use std::fs;
use std::path::{Path, PathBuf};

use crate::core::geo::TileKey;

/// Persistent tile store under a cache root, one PNG file per tile at
/// `root/z/x/y.png`.
///
/// All operations are synchronous blocking I/O and report failure as a
/// boolean or empty result; call them off any latency-sensitive thread.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if let Err(e) = fs::create_dir_all(&root) {
            log::warn!("could not create tile cache root {}: {e}", root.display());
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tile_path(&self, key: TileKey) -> PathBuf {
        self.root
            .join(key.z.to_string())
            .join(key.x.to_string())
            .join(format!("{}.png", key.y))
    }

    pub fn has_tile(&self, key: TileKey) -> bool {
        self.tile_path(key).exists()
    }

    /// Load a tile's bytes. A missing, unreadable, or corrupt file is a
    /// cache miss, never an error.
    pub fn load_tile(&self, key: TileKey) -> Option<Vec<u8>> {
        let bytes = fs::read(self.tile_path(key)).ok()?;
        if image::load_from_memory(&bytes).is_err() {
            log::warn!("discarding corrupt cached tile {key:?}");
            return None;
        }
        Some(bytes)
    }

    /// Store a tile's bytes, creating missing parent directories. Returns
    /// whether the write succeeded.
    pub fn save_tile(&self, key: TileKey, bytes: &[u8]) -> bool {
        let path = self.tile_path(key);
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return false;
            }
        }
        match fs::write(&path, bytes) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to write tile {key:?} to {}: {e}", path.display());
                false
            }
        }
    }

    /// Remove the cache root recursively and recreate it. Best effort; a
    /// generation boundary, not an atomic operation.
    pub fn clear(&self) {
        if let Err(e) = fs::remove_dir_all(&self.root) {
            log::debug!("clearing tile cache {}: {e}", self.root.display());
        }
        if let Err(e) = fs::create_dir_all(&self.root) {
            log::warn!("could not recreate tile cache root {}: {e}", self.root.display());
        }
    }
}
