//! CPU-side image data with a stable identity for texture caching.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of one image's pixel contents. Render devices key their
/// texture caches on this, so two `ImageData` values sharing pixels (via
/// `clone`) map to one GPU texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// RGBA8 pixels plus dimensions. Cloning shares the pixel storage and the
/// identity; building from new pixels mints a fresh identity.
#[derive(Clone, Debug)]
pub struct ImageData {
    id: ImageId,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl ImageData {
    /// Wraps RGBA8 `pixels` of the given dimensions.
    ///
    /// Panics if the pixel buffer length does not match `width * height * 4`;
    /// a mis-sized image is a construction bug, not a runtime condition.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 4,
            "image pixel buffer does not match {width}x{height} RGBA8"
        );
        Self {
            id: ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// A width x height image filled with one RGBA8 value.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self::from_rgba8(width, height, pixels)
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
