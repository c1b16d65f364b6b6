//! JPEG codec adapter using the `image` crate's baseline encoder and decoder.

use std::io::Write;

use image::codecs::jpeg::JpegEncoder;

use crate::normalize::{self, JpegInput, OpaqueView};
use crate::{CodecError, DecodeOutput, ImageFormat, Limits, PixelData};

/// Decode JPEG to pixels.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    super::decode_with_image(data, ImageFormat::Jpeg, limits)
}

/// Encode an image as baseline JPEG.
///
/// Alpha is never written. Opaque images with an alpha channel are encoded
/// through a borrowed view; translucent ones are flattened onto black first.
pub(crate) fn encode(image: &PixelData, quality: u8, sink: &mut dyn Write) -> Result<(), CodecError> {
    let mut encoder = JpegEncoder::new_with_quality(sink, quality);
    let result = match normalize::for_jpeg(image) {
        JpegInput::Rgb(view) => encoder.encode_image(&view),
        JpegInput::Gray(view) => encoder.encode_image(&view),
        JpegInput::OpaqueRgba(view) => encoder.encode_image(&view),
        JpegInput::OpaqueGrayAlpha(view) => encoder.encode_image(&view),
        JpegInput::Flattened(img) => encoder.encode_image(&OpaqueView::from(img.as_ref())),
        JpegInput::FlattenedGray(img) => encoder.encode_image(&OpaqueView::from(img.as_ref())),
    };
    result.map_err(|e| CodecError::from_encoder(ImageFormat::Jpeg, e))
}
