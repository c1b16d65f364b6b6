//! Resource limits for decode operations.

use crate::CodecError;

/// Resource limits for decode operations.
///
/// Guards against decompression bombs. All limits are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum memory allocation in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if dimensions are within limits.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), CodecError> {
        if let Some(max_width) = self.max_width
            && width > max_width
        {
            return Err(CodecError::LimitExceeded(format!(
                "width {width} exceeds limit {max_width}"
            )));
        }

        if let Some(max_height) = self.max_height
            && height > max_height
        {
            return Err(CodecError::LimitExceeded(format!(
                "height {height} exceeds limit {max_height}"
            )));
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err(CodecError::LimitExceeded(format!(
                    "pixel count {pixels} exceeds limit {max_pixels}"
                )));
            }
        }

        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), CodecError> {
        if let Some(max_memory) = self.max_memory_bytes
            && bytes > max_memory
        {
            return Err(CodecError::LimitExceeded(format!(
                "allocation of {bytes} bytes exceeds limit {max_memory}"
            )));
        }
        Ok(())
    }

    /// Check dimensions and the RGBA8 buffer they imply.
    pub fn check_image(&self, width: u64, height: u64) -> Result<(), CodecError> {
        self.check_dimensions(width, height)?;
        self.check_memory(width.saturating_mul(height).saturating_mul(4))
    }

    /// Equivalent limits for decoders driven through the `image` crate.
    #[cfg(any(
        feature = "jpeg",
        feature = "gif",
        feature = "tiff",
        feature = "bmp",
        feature = "webp"
    ))]
    pub(crate) fn to_image_limits(&self) -> image::Limits {
        let mut limits = image::Limits::no_limits();
        limits.max_image_width = self.max_width.map(clamp_u32);
        limits.max_image_height = self.max_height.map(clamp_u32);
        limits.max_alloc = self.max_memory_bytes;
        limits
    }
}

#[cfg(any(
    feature = "jpeg",
    feature = "gif",
    feature = "tiff",
    feature = "bmp",
    feature = "webp"
))]
fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
