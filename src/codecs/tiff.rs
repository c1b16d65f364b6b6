//! TIFF codec adapter: `tiff` crate for encoding, `image` for decoding.

use std::io::{Cursor, Seek, Write};

use tiff::encoder::{Compression, DeflateLevel, Predictor, TiffEncoder, colortype};

use crate::config::TiffCompression;
use crate::pixel::{self, PixelData};
use crate::{CodecError, DecodeOutput, ImageFormat, Limits};

/// Native compression for a configured scheme.
///
/// CCITT fax and JPEG-in-TIFF have no encoder here and are written uncompressed.
fn native_compression(compression: TiffCompression) -> Compression {
    match compression {
        TiffCompression::Uncompressed => Compression::Uncompressed,
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::Deflate => Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::Packbits => Compression::Packbits,
        TiffCompression::CcittGroup3 | TiffCompression::CcittGroup4 | TiffCompression::Jpeg => {
            tracing::debug!(?compression, "no native TIFF encoder, writing uncompressed");
            Compression::Uncompressed
        }
    }
}

/// Decode the first TIFF page.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    super::decode_with_image(data, ImageFormat::Tiff, limits)
}

/// Encode a single-page baseline TIFF.
///
/// The horizontal predictor is applied whenever the scheme supports it.
/// The encoder needs `Seek`, so the file is assembled in memory first.
pub(crate) fn encode(
    image: &PixelData,
    compression: TiffCompression,
    sink: &mut dyn Write,
) -> Result<(), CodecError> {
    let mut cursor = Cursor::new(Vec::new());
    write_tiff(&mut cursor, image, compression)
        .map_err(|e| CodecError::from_encoder(ImageFormat::Tiff, e))?;
    sink.write_all(cursor.get_ref())?;
    Ok(())
}

fn write_tiff<W: Write + Seek>(
    writer: W,
    image: &PixelData,
    compression: TiffCompression,
) -> Result<(), tiff::TiffError> {
    let predictor = if compression.uses_predictor() {
        Predictor::Horizontal
    } else {
        Predictor::None
    };
    let mut encoder = TiffEncoder::new(writer)?
        .with_compression(native_compression(compression))
        .with_predictor(predictor);

    let (width, height) = (image.width(), image.height());
    match image {
        PixelData::Rgb8(img) => {
            encoder.write_image::<colortype::RGB8>(width, height, &pixel::to_bytes(img.as_ref()))
        }
        PixelData::Rgba8(img) => {
            encoder.write_image::<colortype::RGBA8>(width, height, &pixel::to_bytes(img.as_ref()))
        }
        PixelData::Gray8(img) => {
            encoder.write_image::<colortype::Gray8>(width, height, &pixel::to_bytes(img.as_ref()))
        }
        // No gray-alpha color type; widen to RGBA to keep the alpha.
        PixelData::GrayAlpha8(_) => {
            let rgba = image.to_rgba8();
            encoder.write_image::<colortype::RGBA8>(width, height, &pixel::to_bytes(rgba.as_ref()))
        }
    }
}
