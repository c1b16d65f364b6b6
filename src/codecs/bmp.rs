//! BMP codec adapter using the `image` crate.

use std::io::Write;

use image::ExtendedColorType;
use image::codecs::bmp::BmpEncoder;

use crate::pixel::{self, PixelData};
use crate::{CodecError, DecodeOutput, ImageFormat, Limits};

/// Decode BMP to pixels.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    super::decode_with_image(data, ImageFormat::Bmp, limits)
}

/// Encode an uncompressed BMP. Alpha is kept as a 32-bit BMP.
pub(crate) fn encode(image: &PixelData, mut sink: &mut dyn Write) -> Result<(), CodecError> {
    let (color, bytes) = match image {
        PixelData::Rgb8(img) => (ExtendedColorType::Rgb8, pixel::to_bytes(img.as_ref())),
        PixelData::Rgba8(img) => (ExtendedColorType::Rgba8, pixel::to_bytes(img.as_ref())),
        PixelData::Gray8(img) => (ExtendedColorType::L8, pixel::to_bytes(img.as_ref())),
        PixelData::GrayAlpha8(img) => (ExtendedColorType::La8, pixel::to_bytes(img.as_ref())),
    };
    BmpEncoder::new(&mut sink)
        .encode(&bytes, image.width(), image.height(), color)
        .map_err(|e| CodecError::from_encoder(ImageFormat::Bmp, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Gray, ImgVec, Rgb, Rgba};

    fn roundtrip(image: &PixelData) -> PixelData {
        let mut out = Vec::new();
        encode(image, &mut out).unwrap();
        assert_eq!(ImageFormat::detect(&out), Some(ImageFormat::Bmp));
        decode(&out, None).unwrap().pixels
    }

    #[test]
    fn rgb_roundtrip_is_exact() {
        // Odd width exercises row padding.
        let buf = (0..5 * 3).map(|i| Rgb::new(i as u8, 200 - i as u8, 7)).collect();
        let original = PixelData::Rgb8(ImgVec::new(buf, 5, 3));
        assert_eq!(roundtrip(&original).to_rgb8(), original.to_rgb8());
    }

    #[test]
    fn rgba_keeps_alpha() {
        let buf = vec![Rgba::new(10u8, 20, 30, 40), Rgba::new(50, 60, 70, 255)];
        let original = PixelData::Rgba8(ImgVec::new(buf, 2, 1));
        assert_eq!(roundtrip(&original).to_rgba8(), original.to_rgba8());
    }

    #[test]
    fn gray_roundtrip() {
        let buf = (0..16u8).map(|v| Gray::from(v * 16)).collect();
        let original = PixelData::Gray8(ImgVec::new(buf, 4, 4));
        assert_eq!(roundtrip(&original).to_rgb8(), original.to_rgb8());
    }

    /// 54-byte header for a 24-bit bottom-up BMP, followed by no pixel data.
    fn header_only(width: i32, height: i32) -> Vec<u8> {
        let mut out = Vec::with_capacity(54);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&54u32.to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        out.extend_from_slice(&[0; 24]);
        out
    }

    #[test]
    fn limits_reject_header_before_pixels() {
        let data = header_only(4000, 4000);
        let limits = Limits {
            max_pixels: Some(1_000_000),
            ..Default::default()
        };
        let err = decode(&data, Some(&limits)).unwrap_err();
        assert!(matches!(err, CodecError::LimitExceeded(_)), "{err:?}");

        let limits = Limits {
            max_memory_bytes: Some(1 << 20),
            ..Default::default()
        };
        let err = decode(&data, Some(&limits)).unwrap_err();
        assert!(matches!(err, CodecError::LimitExceeded(_)), "{err:?}");
    }

    #[test]
    fn truncated_pixels_within_limits_fail_to_decode() {
        let data = header_only(8, 8);
        let limits = Limits {
            max_pixels: Some(1_000_000),
            ..Default::default()
        };
        assert!(decode(&data, Some(&limits)).unwrap_err().is_decode());
    }
}
