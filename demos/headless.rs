use std::time::Duration;

use tileway::{GeoCoordinate, MapEngine, MapEngineConfig, MapEvent, Viewport};

/// Example of driving the tile engine without any UI: point it at a city,
/// let the loader fetch the visible tiles, and print what arrives.
#[tokio::main]
async fn main() {
    env_logger::init();

    println!("🗺️ Tileway Headless Example");
    println!("===========================");

    let mut config = MapEngineConfig::default();
    config.viewport = Viewport::new(
        GeoCoordinate::new(-122.4194, 37.7749), // San Francisco
        12.0,
        1024,
        768,
    );
    let mut engine = MapEngine::new(config);

    println!("✅ Engine created:");
    println!(
        "   Center: {:.4}, {:.4}",
        engine.viewport().center.lat,
        engine.viewport().center.lon
    );
    println!("   Zoom: {}", engine.viewport().zoom);
    println!("   Source: {}", engine.source().url_template());

    // First pass: cached tiles come back immediately, the rest are
    // handed to the loader.
    let ready = engine.update();
    let visible = engine
        .viewport()
        .visible_tiles(engine.source().algorithm())
        .len();
    println!("\n🎯 First pass: {}/{} tiles already cached", ready.len(), visible);

    // Poll until every visible tile has resolved one way or the other.
    let mut resolved = ready.len();
    let mut failed = 0usize;
    while resolved + failed < visible {
        for event in engine.poll() {
            match event {
                MapEvent::TileReady { key, bytes } => {
                    println!("   📦 {}/{}/{} ready ({} bytes)", key.z, key.x, key.y, bytes.len());
                    resolved += 1;
                }
                MapEvent::TileFailed { key, reason } => {
                    println!("   ⚠️ {}/{}/{} failed: {}", key.z, key.x, key.y, reason);
                    failed += 1;
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    println!("\n📊 Final state:");
    println!("   Tiles resolved: {}", resolved);
    println!("   Tiles failed: {}", failed);
    println!(
        "   Memory cache: {} tiles, {} bytes",
        engine.memory_cache().len(),
        engine.memory_cache().memory_usage()
    );
    println!("   Disk cache root: {}", engine.disk_cache().root().display());

    if engine.take_needs_redraw() {
        println!("   A renderer would redraw now.");
    }

    println!("\n✅ Headless example completed successfully!");
    println!("   A second run serves the same view straight from the disk cache.");
}
