//! Codec adapters for format-specific implementations.
//!
//! Each module is a thin adapter between imgconv's unified API and the
//! format-specific codec crate.

#[cfg(feature = "jpeg")]
pub(crate) mod jpeg;

#[cfg(feature = "png")]
pub(crate) mod png;

#[cfg(feature = "gif")]
pub(crate) mod gif;

#[cfg(feature = "tiff")]
pub(crate) mod tiff;

#[cfg(feature = "bmp")]
pub(crate) mod bmp;

#[cfg(feature = "pdf")]
pub(crate) mod pdf;

#[cfg(feature = "webp")]
pub(crate) mod webp;

#[cfg(any(
    feature = "jpeg",
    feature = "gif",
    feature = "tiff",
    feature = "bmp",
    feature = "webp"
))]
mod dynamic {
    use std::io::Cursor;

    use image::{DynamicImage, ImageDecoder};

    use crate::pixel::{self, Gray, GrayAlpha, PixelData, Rgb, Rgba};
    use crate::{CodecError, DecodeOutput, ImageFormat, ImageInfo, Limits};

    fn image_format(format: ImageFormat) -> Option<image::ImageFormat> {
        match format {
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Pdf => None,
        }
    }

    /// Decode the first frame of `data` with the `image` crate's decoder for `format`.
    pub(crate) fn decode(
        data: &[u8],
        format: ImageFormat,
        limits: Option<&Limits>,
    ) -> Result<DecodeOutput, CodecError> {
        let image_format = image_format(format)
            .ok_or_else(|| CodecError::UnsupportedFormat(format.to_string()))?;
        let mut reader = image::ImageReader::with_format(Cursor::new(data), image_format);
        if let Some(limits) = limits {
            reader.limits(limits.to_image_limits());
        }
        let map_err = |e: image::ImageError| match e {
            image::ImageError::Limits(_) => CodecError::LimitExceeded(e.to_string()),
            e => CodecError::from_decoder(format, e),
        };

        // Headers are parsed here; no pixel buffer exists yet.
        let decoder = reader.into_decoder().map_err(map_err)?;
        if let Some(limits) = limits {
            let (width, height) = decoder.dimensions();
            limits.check_image(u64::from(width), u64::from(height))?;
            limits.check_memory(decoder.total_bytes())?;
        }

        let decoded = DynamicImage::from_decoder(decoder).map_err(map_err)?;
        let pixels = from_dynamic(decoded, format)?;
        let info = ImageInfo::new(pixels.width(), pixels.height(), format, pixels.has_alpha());
        Ok(DecodeOutput { pixels, info })
    }

    /// Convert an `image` buffer into [`PixelData`], narrowing deep formats to 8 bits.
    fn from_dynamic(
        img: DynamicImage,
        format: ImageFormat,
    ) -> Result<PixelData, CodecError> {
        let (w, h) = (img.width(), img.height());
        let mismatch = || {
            CodecError::from_decoder(format, "decoded buffer does not match its dimensions")
        };
        let pixels = match img {
            DynamicImage::ImageLuma8(buf) => {
                PixelData::Gray8(pixel::from_bytes::<Gray<u8>>(buf.as_raw(), w, h).ok_or_else(mismatch)?)
            }
            DynamicImage::ImageLumaA8(buf) => PixelData::GrayAlpha8(
                pixel::from_bytes::<GrayAlpha<u8>>(buf.as_raw(), w, h).ok_or_else(mismatch)?,
            ),
            DynamicImage::ImageRgb8(buf) => {
                PixelData::Rgb8(pixel::from_bytes::<Rgb<u8>>(buf.as_raw(), w, h).ok_or_else(mismatch)?)
            }
            DynamicImage::ImageRgba8(buf) => {
                PixelData::Rgba8(pixel::from_bytes::<Rgba<u8>>(buf.as_raw(), w, h).ok_or_else(mismatch)?)
            }
            other if other.color().has_alpha() => {
                let buf = other.into_rgba8();
                PixelData::Rgba8(pixel::from_bytes::<Rgba<u8>>(buf.as_raw(), w, h).ok_or_else(mismatch)?)
            }
            other => {
                let buf = other.into_rgb8();
                PixelData::Rgb8(pixel::from_bytes::<Rgb<u8>>(buf.as_raw(), w, h).ok_or_else(mismatch)?)
            }
        };
        Ok(pixels)
    }
}

#[cfg(any(
    feature = "jpeg",
    feature = "gif",
    feature = "tiff",
    feature = "bmp",
    feature = "webp"
))]
pub(crate) use dynamic::decode as decode_with_image;
