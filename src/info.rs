//! Image metadata returned alongside decoded pixels.

use crate::ImageFormat;

/// Basic facts about a decoded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container format the pixels came from.
    pub format: ImageFormat,
    /// Whether the decoded pixels carry an alpha channel.
    pub has_alpha: bool,
    /// Number of frames when the container reports it. Only the first is decoded.
    pub frame_count: Option<u32>,
}

impl ImageInfo {
    /// Single-frame image info.
    pub fn new(width: u32, height: u32, format: ImageFormat, has_alpha: bool) -> Self {
        Self {
            width,
            height,
            format,
            has_alpha,
            frame_count: Some(1),
        }
    }

    /// Set the frame count.
    pub fn with_frame_count(mut self, frame_count: Option<u32>) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Whether the container holds more than one frame.
    pub fn is_animated(&self) -> bool {
        self.frame_count.is_some_and(|n| n > 1)
    }
}
