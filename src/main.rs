//! LRU Memcache demo
//!
//! Fills a bitmap cache from several threads and reports what survived.

use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_memcache::{Bitmap, BitmapLruCache, BitmapWeigher, CacheBuilder, Config, PixelFormat};

const WORKERS: usize = 4;

/// Smallest tile side in pixels; tiles cycle through 1..=8 multiples of it.
const TILE_STEP: i64 = 64;

/// Share of the size budget a single tile may take.
const TILE_BUDGET_DIVISOR: i64 = 4;

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build a bitmap cache with the configured capacity
/// 4. Insert and read back bitmaps from several threads
/// 5. Print final statistics as JSON
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_memcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, label={}, demo_keys={}",
        config.capacity, config.label, config.demo_keys
    );

    let cache = CacheBuilder::from_config(&config)
        .weigher_impl(BitmapWeigher)
        .build::<String, Arc<Bitmap>>()
        .context("failed to build cache")?;
    info!(max_size = cache.max_size(), "Cache initialized");

    run_workload(&cache, config.demo_keys)?;

    let survivors: Vec<String> = cache.snapshot().into_iter().map(|(k, _)| k).collect();
    info!(entries = survivors.len(), "Surviving keys: {:?}", survivors);

    let stats = cache.stats();
    info!(hit_rate = stats.hit_rate(), "Workload complete");
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

// == Workload ==
/// Writes `keys` tiles split across worker threads, reading back earlier keys.
fn run_workload(cache: &BitmapLruCache, keys: usize) -> anyhow::Result<()> {
    let max_size = cache.max_size();

    thread::scope(|scope| -> anyhow::Result<()> {
        let handles: Vec<_> = (0..WORKERS)
            .map(|worker| {
                scope.spawn(move || -> anyhow::Result<()> {
                    for i in (worker..keys).step_by(WORKERS) {
                        let tile = demo_tile(i, max_size)?;
                        cache.put(format!("image-{i}"), Arc::new(tile))?;
                        if i >= WORKERS {
                            cache.get(&format!("image-{}", i - WORKERS))?;
                        }
                    }
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })
}

// == Tile Sizing ==
/// Builds the square ARGB tile for key `index`.
///
/// Sides cycle through 64, 128 .. 512 pixels, halved until the tile fits in a
/// quarter of `max_size`, so several tiles always fit in the cache.
fn demo_tile(index: usize, max_size: i64) -> anyhow::Result<Bitmap> {
    let step = i64::try_from(index % 8).context("tile index out of range")? + 1;
    let mut side = TILE_STEP
        .checked_mul(step)
        .ok_or_else(|| anyhow!("tile side overflow"))?;

    let tile_budget = max_size / TILE_BUDGET_DIVISOR;
    let bytes_per_pixel = PixelFormat::Argb8888.bytes_per_pixel();
    while side > 1 && side * side * bytes_per_pixel > tile_budget {
        side /= 2;
    }

    let side = i32::try_from(side).context("tile side does not fit in i32")?;
    Ok(Bitmap::new(side, side, PixelFormat::Argb8888))
}
