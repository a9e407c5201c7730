//! Scene asset decoding and the all-must-complete load barrier.

use std::sync::Arc;

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// Concurrent loading with a bounded barrier.
pub mod loader;

/// Number of images in a scene.
pub const ASSET_COUNT: usize = 3;

/// Decoded image ready for drawing, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed premultiplied RGBA8 bytes, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build from straight-alpha RGBA8 pixels (for in-memory assets).
    pub fn from_straight_rgba8(
        width: u32,
        height: u32,
        mut rgba: Vec<u8>,
    ) -> crate::SpindleResult<Self> {
        if width == 0 || height == 0 {
            return Err(crate::SpindleError::validation("image must be non-empty"));
        }
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(crate::SpindleError::validation(format!(
                "image byte len {} does not match {width}x{height}",
                rgba.len()
            )));
        }
        decode::premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Smaller of the two dimensions.
    pub fn min_dim(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// The three scene images, all loaded. Immutable once built.
#[derive(Clone, Debug)]
pub struct AssetSet {
    images: [Arc<PreparedImage>; ASSET_COUNT],
}

impl AssetSet {
    /// Wrap three loaded images in paint order.
    pub fn new(images: [Arc<PreparedImage>; ASSET_COUNT]) -> Self {
        Self { images }
    }

    /// Image in `slot`, if the slot exists.
    pub fn get(&self, slot: usize) -> Option<&Arc<PreparedImage>> {
        self.images.get(slot)
    }

    /// Images in paint order.
    pub fn images(&self) -> &[Arc<PreparedImage>; ASSET_COUNT] {
        &self.images
    }

    /// `(width, height)` of each image.
    pub fn sizes(&self) -> [(u32, u32); ASSET_COUNT] {
        std::array::from_fn(|i| (self.images[i].width, self.images[i].height))
    }
}
