//! Image decoding.

use std::io::Read;

use crate::{CodecError, CodecRegistry, ImageFormat, ImageInfo, Limits, PixelData};

/// Decoded image output.
#[derive(Debug)]
pub struct DecodeOutput {
    /// Pixels in the decoder's native 8-bit layout.
    pub pixels: PixelData,
    /// Image metadata.
    pub info: ImageInfo,
}

impl DecodeOutput {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Format the image was decoded from.
    pub fn format(&self) -> ImageFormat {
        self.info.format
    }
}

/// Builder for one decode call.
///
/// # Example
///
/// ```no_run
/// use imgconv::DecodeRequest;
///
/// let bytes = std::fs::read("photo.tif")?;
/// let output = DecodeRequest::new(&bytes).decode()?;
/// assert_eq!(output.format(), imgconv::ImageFormat::Tiff);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    format: Option<ImageFormat>,
    limits: Option<&'a Limits>,
    registry: Option<&'a CodecRegistry>,
}

impl<'a> DecodeRequest<'a> {
    /// Decode `data`, sniffing its format from the leading bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            format: None,
            limits: None,
            registry: None,
        }
    }

    /// Skip sniffing and run this format's decoder.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Reject images larger than `limits`.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Only run decoders `registry` allows.
    pub fn with_registry(mut self, registry: &'a CodecRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Run the decoder.
    ///
    /// Unrecognized bytes and decoder failures are both [`CodecError::Decode`].
    pub fn decode(self) -> Result<DecodeOutput, CodecError> {
        let default_registry = CodecRegistry::all();
        let registry = self.registry.unwrap_or(&default_registry);

        let format = match self.format {
            Some(f) => f,
            None => ImageFormat::detect(self.data).ok_or_else(CodecError::unrecognized)?,
        };

        if !registry.can_decode(format) {
            return Err(CodecError::DisabledFormat(format));
        }

        tracing::debug!(%format, len = self.data.len(), forced = self.format.is_some(), "decoding image");
        let output = self.decode_format(format)?;
        tracing::debug!(
            %format,
            width = output.width(),
            height = output.height(),
            has_alpha = output.info.has_alpha,
            "decoded image"
        );
        Ok(output)
    }

    // One arm per format; compiled-out codecs report themselves disabled.
    fn decode_format(self, format: ImageFormat) -> Result<DecodeOutput, CodecError> {
        match format {
            #[cfg(feature = "jpeg")]
            ImageFormat::Jpeg => crate::codecs::jpeg::decode(self.data, self.limits),
            #[cfg(not(feature = "jpeg"))]
            ImageFormat::Jpeg => Err(CodecError::DisabledFormat(format)),

            #[cfg(feature = "png")]
            ImageFormat::Png => crate::codecs::png::decode(self.data, self.limits),
            #[cfg(not(feature = "png"))]
            ImageFormat::Png => Err(CodecError::DisabledFormat(format)),

            #[cfg(feature = "gif")]
            ImageFormat::Gif => crate::codecs::gif::decode(self.data, self.limits),
            #[cfg(not(feature = "gif"))]
            ImageFormat::Gif => Err(CodecError::DisabledFormat(format)),

            #[cfg(feature = "tiff")]
            ImageFormat::Tiff => crate::codecs::tiff::decode(self.data, self.limits),
            #[cfg(not(feature = "tiff"))]
            ImageFormat::Tiff => Err(CodecError::DisabledFormat(format)),

            #[cfg(feature = "bmp")]
            ImageFormat::Bmp => crate::codecs::bmp::decode(self.data, self.limits),
            #[cfg(not(feature = "bmp"))]
            ImageFormat::Bmp => Err(CodecError::DisabledFormat(format)),

            #[cfg(feature = "pdf")]
            ImageFormat::Pdf => crate::codecs::pdf::decode(self.data, self.limits),
            #[cfg(not(feature = "pdf"))]
            ImageFormat::Pdf => Err(CodecError::DisabledFormat(format)),

            #[cfg(feature = "webp")]
            ImageFormat::WebP => crate::codecs::webp::decode(self.data, self.limits),
            #[cfg(not(feature = "webp"))]
            ImageFormat::WebP => Err(CodecError::DisabledFormat(format)),
        }
    }
}

/// Read `reader` to the end and decode it with format detection.
pub fn decode_from(mut reader: impl Read) -> Result<DecodeOutput, CodecError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    DecodeRequest::new(&data).decode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_records_settings() {
        let data = b"test";
        let limits = Limits::none();
        let request = DecodeRequest::new(data)
            .with_format(ImageFormat::Jpeg)
            .with_limits(&limits);
        assert_eq!(request.format, Some(ImageFormat::Jpeg));
        assert!(request.limits.is_some());
    }

    #[test]
    fn registry_blocks_detected_format() {
        let header = b"BM\x46\0\0\0\0\0\0\0\x36\0\0\0";
        let registry = CodecRegistry::all().with_decode(ImageFormat::Bmp, false);
        let result = DecodeRequest::new(header).with_registry(&registry).decode();
        assert!(matches!(
            result,
            Err(CodecError::DisabledFormat(ImageFormat::Bmp))
        ));
    }

    #[test]
    fn unrecognized_stream() {
        let err = DecodeRequest::new(b"Hello").decode().unwrap_err();
        assert!(err.is_decode());
        assert!(matches!(err, CodecError::Decode { format: None, .. }));
    }

    #[test]
    fn forced_format_runs_its_decoder() {
        let registry = CodecRegistry::all();
        for format in registry.decodable_formats() {
            let err = DecodeRequest::new(b"Hello")
                .with_format(format)
                .decode()
                .unwrap_err();
            assert!(err.is_decode(), "{format}: {err}");
        }
    }

    #[test]
    fn reader_errors_are_io() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("unplugged"))
            }
        }
        assert!(matches!(decode_from(Broken), Err(CodecError::Io(_))));
    }

    #[cfg(feature = "png")]
    #[test]
    fn decode_from_reader() {
        use crate::config::PngCompression;
        use crate::pixel::{ImgVec, Rgb};

        let image = PixelData::Rgb8(ImgVec::new(vec![Rgb::new(1u8, 2, 3); 6], 3, 2));
        let mut data = Vec::new();
        crate::codecs::png::encode(&image, PngCompression::Default, &mut data).unwrap();

        let output = decode_from(std::io::Cursor::new(data)).unwrap();
        assert_eq!((output.width(), output.height()), (3, 2));
        assert_eq!(output.format(), ImageFormat::Png);
        assert_eq!(output.pixels, image);
    }
}
