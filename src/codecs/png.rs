//! PNG codec adapter using the png crate.

use std::io::{Cursor, Write};

use crate::config::PngCompression;
use crate::pixel::{self, Gray, GrayAlpha, PixelData, Rgb, Rgba};
use crate::{CodecError, DecodeOutput, ImageFormat, ImageInfo, Limits};

fn native_compression(level: PngCompression) -> png::Compression {
    match level {
        PngCompression::Default => png::Compression::Balanced,
        PngCompression::None => png::Compression::NoCompression,
        PngCompression::BestSpeed => png::Compression::Fastest,
        PngCompression::BestCompression => png::Compression::High,
    }
}

/// Decode PNG to pixels.
///
/// Palettes and low bit depths are expanded and 16-bit samples are stripped
/// to 8 bits. Only the default image of an APNG is decoded.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    let cursor = Cursor::new(data);
    let mut decoder = match limits.and_then(|l| l.max_memory_bytes) {
        Some(bytes) => png::Decoder::new_with_limits(
            cursor,
            png::Limits {
                bytes: usize::try_from(bytes).unwrap_or(usize::MAX),
            },
        ),
        None => png::Decoder::new(cursor),
    };
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::from_decoder(ImageFormat::Png, e))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let frame_count = info.animation_control.map_or(1, |actl| actl.num_frames);

    if let Some(limits) = limits {
        limits.check_image(u64::from(width), u64::from(height))?;
    }

    let buffer_size = reader.output_buffer_size().ok_or_else(|| {
        CodecError::from_decoder(ImageFormat::Png, "cannot determine PNG output buffer size")
    })?;
    let mut raw_pixels = vec![0u8; buffer_size];

    let output_info = reader
        .next_frame(&mut raw_pixels)
        .map_err(|e| CodecError::from_decoder(ImageFormat::Png, e))?;
    raw_pixels.truncate(output_info.buffer_size());

    let mismatch =
        || CodecError::from_decoder(ImageFormat::Png, "decoded buffer does not match its dimensions");
    let (color_type, _bit_depth) = reader.output_color_type();
    let pixels = match color_type {
        png::ColorType::Rgba => PixelData::Rgba8(
            pixel::from_bytes::<Rgba<u8>>(&raw_pixels, width, height).ok_or_else(mismatch)?,
        ),
        png::ColorType::Rgb => PixelData::Rgb8(
            pixel::from_bytes::<Rgb<u8>>(&raw_pixels, width, height).ok_or_else(mismatch)?,
        ),
        png::ColorType::GrayscaleAlpha => PixelData::GrayAlpha8(
            pixel::from_bytes::<GrayAlpha<u8>>(&raw_pixels, width, height).ok_or_else(mismatch)?,
        ),
        png::ColorType::Grayscale => PixelData::Gray8(
            pixel::from_bytes::<Gray<u8>>(&raw_pixels, width, height).ok_or_else(mismatch)?,
        ),
        // EXPAND turns palettes into RGB or RGBA.
        png::ColorType::Indexed => {
            return Err(CodecError::from_decoder(
                ImageFormat::Png,
                "indexed output after palette expansion",
            ));
        }
    };

    Ok(DecodeOutput {
        info: ImageInfo::new(width, height, ImageFormat::Png, pixels.has_alpha())
            .with_frame_count(Some(frame_count)),
        pixels,
    })
}

/// Encode an image as 8-bit PNG in its own color type.
pub(crate) fn encode(
    image: &PixelData,
    compression: PngCompression,
    sink: &mut dyn Write,
) -> Result<(), CodecError> {
    let (color_type, bytes) = match image {
        PixelData::Rgb8(img) => (png::ColorType::Rgb, pixel::to_bytes(img.as_ref())),
        PixelData::Rgba8(img) => (png::ColorType::Rgba, pixel::to_bytes(img.as_ref())),
        PixelData::Gray8(img) => (png::ColorType::Grayscale, pixel::to_bytes(img.as_ref())),
        PixelData::GrayAlpha8(img) => {
            (png::ColorType::GrayscaleAlpha, pixel::to_bytes(img.as_ref()))
        }
    };

    let mut encoder = png::Encoder::new(sink, image.width(), image.height());
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(native_compression(compression));
    tracing::trace!(?color_type, ?compression, "png encoder configured");

    let mut writer = encoder
        .write_header()
        .map_err(|e| CodecError::from_encoder(ImageFormat::Png, e))?;
    writer
        .write_image_data(&bytes)
        .map_err(|e| CodecError::from_encoder(ImageFormat::Png, e))?;
    writer
        .finish()
        .map_err(|e| CodecError::from_encoder(ImageFormat::Png, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ImgVec;

    fn noisy_rgba(w: usize, h: usize) -> ImgVec<Rgba<u8>> {
        let buf = (0..w * h)
            .map(|i| {
                let v = (i as u32).wrapping_mul(2_654_435_761);
                Rgba::new(v as u8, (v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8)
            })
            .collect();
        ImgVec::new(buf, w, h)
    }

    fn encode_vec(image: &PixelData, compression: PngCompression) -> Vec<u8> {
        let mut out = Vec::new();
        encode(image, compression, &mut out).unwrap();
        out
    }

    #[test]
    fn rgba_roundtrip_is_exact() {
        let original = PixelData::Rgba8(noisy_rgba(19, 7));
        let data = encode_vec(&original, PngCompression::Default);
        let decoded = decode(&data, None).unwrap();
        assert_eq!(decoded.pixels, original);
        assert!(decoded.info.has_alpha);
        assert_eq!(decoded.info.frame_count, Some(1));
    }

    #[test]
    fn gray_roundtrip_keeps_layout() {
        let buf = (0..64u8).map(Gray::from).collect();
        let original = PixelData::Gray8(ImgVec::new(buf, 8, 8));
        let data = encode_vec(&original, PngCompression::BestCompression);
        assert_eq!(decode(&data, None).unwrap().pixels, original);
    }

    #[test]
    fn strided_source_is_packed() {
        let buf = vec![Rgb::new(1u8, 2, 3), Rgb::new(4, 5, 6), Rgb::new(0, 0, 0)];
        let original = PixelData::Rgb8(ImgVec::new_stride(buf, 2, 1, 3));
        let data = encode_vec(&original, PngCompression::BestSpeed);
        let decoded = decode(&data, None).unwrap();
        assert_eq!(
            decoded.pixels.to_rgb8().buf().as_slice(),
            &[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]
        );
    }

    #[test]
    fn compression_levels_differ() {
        let buf = vec![Rgb::new(10u8, 20, 30); 128 * 128];
        let img = PixelData::Rgb8(ImgVec::new(buf, 128, 128));
        let none = encode_vec(&img, PngCompression::None);
        let best = encode_vec(&img, PngCompression::BestCompression);
        assert!(best.len() < none.len());
    }

    #[test]
    fn limits_reject_large_images() {
        let data = encode_vec(&PixelData::Rgba8(noisy_rgba(64, 64)), PngCompression::Default);
        let limits = Limits {
            max_width: Some(32),
            ..Default::default()
        };
        assert!(matches!(
            decode(&data, Some(&limits)),
            Err(CodecError::LimitExceeded(_))
        ));
    }

    #[test]
    fn truncated_stream_is_decode_error() {
        let data = encode_vec(&PixelData::Rgba8(noisy_rgba(16, 16)), PngCompression::Default);
        let err = decode(&data[..data.len() / 2], None).unwrap_err();
        assert!(err.is_decode());
    }
}
