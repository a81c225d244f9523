pub mod cache;
pub mod disk;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::MemoryCache;
pub use disk::DiskCache;
pub use loader::{TileEvent, TileLoader};
pub use source::TileSource;
