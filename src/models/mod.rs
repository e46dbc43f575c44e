//! Models Module
//!
//! Concrete value types with their cache specializations.

pub mod bitmap;

pub use bitmap::{bitmap_cache, Bitmap, BitmapLruCache, BitmapWeigher, PixelFormat};
