//! PDF codec adapter using `lopdf`.
//!
//! Encoding writes a one-page document whose only content is the image,
//! embedded as a DCT (JPEG) stream. The page is sized one point per pixel.
//! Decoding extracts the first image XObject on the first page.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::pixel::{self, Gray, PixelData, Rgb};
use crate::{CodecError, DecodeOutput, ImageFormat, ImageInfo, Limits};

const IMAGE_NAME: &str = "Im0";

/// Encode `image` as a single-page PDF with a JPEG image at `quality`.
pub(crate) fn encode(
    image: &PixelData,
    quality: u8,
    mut sink: &mut dyn Write,
) -> Result<(), CodecError> {
    let mut jpeg = Vec::new();
    super::jpeg::encode(image, quality, &mut jpeg).map_err(|e| match e {
        CodecError::Encode { .. } => CodecError::from_encoder(ImageFormat::Pdf, e),
        e => e,
    })?;

    let color_space = match image {
        PixelData::Gray8(_) | PixelData::GrayAlpha8(_) => "DeviceGray",
        PixelData::Rgb8(_) | PixelData::Rgba8(_) => "DeviceRGB",
    };
    let width = i64::from(image.width());
    let height = i64::from(image.height());
    tracing::trace!(width, height, color_space, jpeg_len = jpeg.len(), "embedding PDF image");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    )
    .with_compression(false);
    let image_id = doc.add_object(image_stream);

    // Scale the unit square to the page, then paint the image.
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| CodecError::from_encoder(ImageFormat::Pdf, e))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image_id },
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save_to(&mut sink)
        .map_err(|e| CodecError::from_encoder(ImageFormat::Pdf, e))
}

/// Decode the first image on the first page of a PDF.
///
/// DCT images go through the JPEG decoder. Unfiltered and Flate images are
/// read as 8-bit DeviceRGB or DeviceGray samples.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    let fail = |e: lopdf::Error| CodecError::from_decoder(ImageFormat::Pdf, e);
    let doc = Document::load_mem(data).map_err(fail)?;

    let page_id = doc
        .get_pages()
        .into_values()
        .next()
        .ok_or_else(|| CodecError::from_decoder(ImageFormat::Pdf, "document has no pages"))?;
    let images = doc.get_page_images(page_id).map_err(fail)?;
    let image = images.first().ok_or_else(|| {
        CodecError::InvalidInput("first PDF page contains no image".into())
    })?;

    let dim = |v: i64| {
        u32::try_from(v).map_err(|_| {
            CodecError::from_decoder(ImageFormat::Pdf, format!("invalid image dimension {v}"))
        })
    };
    let (width, height) = (dim(image.width)?, dim(image.height)?);
    if let Some(limits) = limits {
        limits.check_image(u64::from(width), u64::from(height))?;
    }

    let filters = image.filters.as_deref().unwrap_or_default();
    tracing::trace!(width, height, ?filters, color_space = ?image.color_space, "PDF image");

    if filters.iter().any(|f| f == "DCTDecode") {
        let jpeg = super::jpeg::decode(image.content, limits)?;
        let info = ImageInfo::new(jpeg.info.width, jpeg.info.height, ImageFormat::Pdf, false);
        return Ok(DecodeOutput {
            pixels: jpeg.pixels,
            info,
        });
    }

    let samples = match filters {
        [] => image.content.to_vec(),
        [f] if f == "FlateDecode" => doc
            .get_object(image.id)
            .and_then(Object::as_stream)
            .and_then(Stream::decompressed_content)
            .map_err(fail)?,
        other => {
            return Err(CodecError::from_decoder(
                ImageFormat::Pdf,
                format!("unsupported image filter chain {other:?}"),
            ));
        }
    };

    if image.bits_per_component != Some(8) {
        return Err(CodecError::from_decoder(
            ImageFormat::Pdf,
            format!("unsupported bits per component {:?}", image.bits_per_component),
        ));
    }

    let mismatch =
        || CodecError::from_decoder(ImageFormat::Pdf, "image stream does not match its dimensions");
    let pixels = match image.color_space.as_deref() {
        Some("DeviceRGB") => PixelData::Rgb8(
            pixel::from_bytes::<Rgb<u8>>(&samples, width, height).ok_or_else(mismatch)?,
        ),
        Some("DeviceGray") => PixelData::Gray8(
            pixel::from_bytes::<Gray<u8>>(&samples, width, height).ok_or_else(mismatch)?,
        ),
        other => {
            return Err(CodecError::from_decoder(
                ImageFormat::Pdf,
                format!("unsupported color space {other:?}"),
            ));
        }
    };

    Ok(DecodeOutput {
        info: ImageInfo::new(width, height, ImageFormat::Pdf, false),
        pixels,
    })
}
