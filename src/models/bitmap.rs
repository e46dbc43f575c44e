//! Bitmap Model
//!
//! Decoded-image descriptors and the byte-footprint weigher that turns an
//! [`LruCache`] into a memory-bounded image cache.

use std::sync::Arc;

use crate::cache::{LruCache, Weigher};
use crate::error::Result;

/// Label reported by bitmap caches in faults and logs.
pub const BITMAP_CACHE_LABEL: &str = "BitmapLruCache";

// == Pixel Format ==
/// Pixel storage layout of a decoded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit alpha mask
    Alpha8,
    Rgb565,
    Argb4444,
    Argb8888,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> i64 {
        match self {
            PixelFormat::Alpha8 => 1,
            PixelFormat::Rgb565 | PixelFormat::Argb4444 => 2,
            PixelFormat::Argb8888 => 4,
        }
    }
}

// == Bitmap ==
/// Dimensions and format of a decoded image.
///
/// Dimensions are signed, as they arrive from decoders; a corrupt descriptor
/// yields a negative byte count that the cache rejects as a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmap {
    pub width: i32,
    pub height: i32,
    pub format: PixelFormat,
}

impl Bitmap {
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Bytes between the starts of consecutive pixel rows.
    pub fn row_bytes(&self) -> i64 {
        i64::from(self.width) * self.format.bytes_per_pixel()
    }

    /// Bytes needed to store the pixel buffer. Saturates at `i64::MAX`.
    pub fn byte_count(&self) -> i64 {
        self.row_bytes().saturating_mul(i64::from(self.height))
    }
}

// == Bitmap Weigher ==
/// Sizes bitmaps by their pixel buffer footprint in bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapWeigher;

impl Weigher<Bitmap> for BitmapWeigher {
    fn size_of(&self, value: &Bitmap) -> i64 {
        value.byte_count()
    }
}

impl Weigher<Arc<Bitmap>> for BitmapWeigher {
    fn size_of(&self, value: &Arc<Bitmap>) -> i64 {
        value.byte_count()
    }
}

/// Memory-bounded cache of shared bitmaps keyed by string.
pub type BitmapLruCache = LruCache<String, Arc<Bitmap>, BitmapWeigher>;

/// Creates a bitmap cache holding at most `capacity_mib` MiB of pixels.
///
/// # Errors
/// `InvalidCapacity` if `capacity_mib <= 0`.
pub fn bitmap_cache(capacity_mib: i64) -> Result<BitmapLruCache> {
    LruCache::with_weigher(capacity_mib, BITMAP_CACHE_LABEL, BitmapWeigher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::UNIT_SIZE;
    use crate::error::CacheError;

    fn square(side: i32) -> Arc<Bitmap> {
        Arc::new(Bitmap::new(side, side, PixelFormat::Alpha8))
    }

    #[test]
    fn test_label() {
        let cache = bitmap_cache(3).unwrap();
        assert_eq!(cache.label(), "BitmapLruCache");
        assert_eq!(cache.max_size(), 3 * UNIT_SIZE);
    }

    #[test]
    fn test_bitmap_size() {
        let cache = bitmap_cache(3).unwrap();
        assert_eq!(cache.size_of(&square(1)), 1);
        assert_eq!(cache.size_of(&square(2)), 4);
        assert_eq!(cache.size_of(&square(3)), 9);
        assert_eq!(cache.size_of(&square(4)), 16);
        assert_eq!(cache.size_of(&square(5)), 25);
    }

    #[test]
    fn test_format_footprint() {
        let argb = Bitmap::new(10, 3, PixelFormat::Argb8888);
        assert_eq!(argb.row_bytes(), 40);
        assert_eq!(argb.byte_count(), 120);

        let rgb = Bitmap::new(10, 3, PixelFormat::Rgb565);
        assert_eq!(rgb.byte_count(), 60);
    }

    #[test]
    fn test_large_dimensions_saturate() {
        let huge = Bitmap::new(i32::MAX, i32::MAX, PixelFormat::Argb8888);
        assert_eq!(huge.byte_count(), i64::MAX);

        let cache = bitmap_cache(1).unwrap();
        cache.put("huge".to_string(), Arc::new(huge)).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);
    }

    #[test]
    fn test_corrupt_bitmap_is_a_fault() {
        let cache = bitmap_cache(1).unwrap();
        let corrupt = Arc::new(Bitmap::new(-4, 4, PixelFormat::Alpha8));

        let err = cache.put("bad".to_string(), corrupt).unwrap_err();
        assert!(matches!(err, CacheError::NegativeSize { size: -16, .. }));
        assert!(err.to_string().starts_with("BitmapLruCache"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_byte_budget() {
        let cache = bitmap_cache(3).unwrap();
        // 768 * 4 * 512 bytes = 1.5 MiB each
        let tile = || Arc::new(Bitmap::new(768, 512, PixelFormat::Argb8888));

        cache.put("a".to_string(), tile()).unwrap();
        cache.put("b".to_string(), tile()).unwrap();
        assert_eq!(cache.current_size(), 3 * UNIT_SIZE);

        cache.put("c".to_string(), tile()).unwrap();
        assert!(!cache.contains_key("a"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 3 * UNIT_SIZE);
    }
}
