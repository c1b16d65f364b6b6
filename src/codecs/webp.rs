//! WebP decoding through the `image` crate. There is no WebP encoder.

use crate::{CodecError, DecodeOutput, ImageFormat, Limits};

/// Decode a still WebP, or the first frame of an animated one.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    super::decode_with_image(data, ImageFormat::WebP, limits)
}
