//! Image encoding.
//!
//! A [`FormatOption`] pairs a target format with an ordered list of
//! [`EncodeOption`]s. Encoding builds a fresh [`EncodeConfig`] from those
//! options, projects it into the [`CodecSettings`] for that one format, and
//! hands the image to the matching codec adapter.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::config::{
    DEFAULT_GIF_NUM_COLORS, EncodeConfig, EncodeOption, GifDrawer, PngCompression,
    TiffCompression,
};
use crate::quantize::Quantizer;
use crate::{CodecError, CodecRegistry, ImageFormat, PixelData};

/// Encoded image output.
#[derive(Clone, Debug)]
pub struct EncodeOutput {
    /// Encoded image data.
    pub data: Vec<u8>,
    /// Format used for encoding.
    pub format: ImageFormat,
}

/// The configuration fields one codec reads, already validated for it.
#[derive(Clone)]
pub enum CodecSettings {
    Jpeg {
        quality: u8,
    },
    Png {
        compression: PngCompression,
    },
    Gif {
        num_colors: usize,
        quantizer: Option<Arc<dyn Quantizer>>,
        drawer: GifDrawer,
    },
    Tiff {
        compression: TiffCompression,
    },
    Bmp,
    Pdf {
        quality: u8,
    },
}

/// Quality the JPEG encoder accepts: `1..=100`.
fn clamp_quality(quality: i32) -> u8 {
    quality.clamp(1, 100) as u8
}

/// Palette size for a configured GIF color count; out-of-range counts use 256.
fn gif_num_colors(num_colors: i32) -> usize {
    match usize::try_from(num_colors) {
        Ok(n @ 1..=256) => n,
        _ => DEFAULT_GIF_NUM_COLORS as usize,
    }
}

impl CodecSettings {
    /// Project `config` onto the fields `format` understands.
    ///
    /// Fails with [`CodecError::UnsupportedFormat`] for decode-only formats.
    pub fn resolve(format: ImageFormat, config: &EncodeConfig) -> Result<Self, CodecError> {
        let settings = match format {
            ImageFormat::Jpeg => CodecSettings::Jpeg {
                quality: clamp_quality(config.quality),
            },
            ImageFormat::Png => CodecSettings::Png {
                compression: config.png_compression,
            },
            ImageFormat::Gif => CodecSettings::Gif {
                num_colors: gif_num_colors(config.gif_num_colors),
                quantizer: config.gif_quantizer.clone(),
                drawer: config.gif_drawer.unwrap_or_default(),
            },
            ImageFormat::Tiff => CodecSettings::Tiff {
                compression: config.tiff_compression,
            },
            ImageFormat::Bmp => CodecSettings::Bmp,
            ImageFormat::Pdf => CodecSettings::Pdf {
                quality: clamp_quality(config.quality),
            },
            ImageFormat::WebP => return Err(CodecError::UnsupportedFormat(format.to_string())),
        };
        Ok(settings)
    }

    /// Format these settings encode.
    pub fn format(&self) -> ImageFormat {
        match self {
            CodecSettings::Jpeg { .. } => ImageFormat::Jpeg,
            CodecSettings::Png { .. } => ImageFormat::Png,
            CodecSettings::Gif { .. } => ImageFormat::Gif,
            CodecSettings::Tiff { .. } => ImageFormat::Tiff,
            CodecSettings::Bmp => ImageFormat::Bmp,
            CodecSettings::Pdf { .. } => ImageFormat::Pdf,
        }
    }

    /// Dispatch to the format-specific encoder.
    fn encode(&self, image: &PixelData, sink: &mut dyn Write) -> Result<(), CodecError> {
        match self {
            #[cfg(feature = "jpeg")]
            CodecSettings::Jpeg { quality } => crate::codecs::jpeg::encode(image, *quality, sink),
            #[cfg(not(feature = "jpeg"))]
            CodecSettings::Jpeg { .. } => Err(CodecError::DisabledFormat(ImageFormat::Jpeg)),

            #[cfg(feature = "png")]
            CodecSettings::Png { compression } => {
                crate::codecs::png::encode(image, *compression, sink)
            }
            #[cfg(not(feature = "png"))]
            CodecSettings::Png { .. } => Err(CodecError::DisabledFormat(ImageFormat::Png)),

            #[cfg(feature = "gif")]
            CodecSettings::Gif {
                num_colors,
                quantizer,
                drawer,
            } => crate::codecs::gif::encode(image, *num_colors, quantizer.as_deref(), *drawer, sink),
            #[cfg(not(feature = "gif"))]
            CodecSettings::Gif { .. } => Err(CodecError::DisabledFormat(ImageFormat::Gif)),

            #[cfg(feature = "tiff")]
            CodecSettings::Tiff { compression } => {
                crate::codecs::tiff::encode(image, *compression, sink)
            }
            #[cfg(not(feature = "tiff"))]
            CodecSettings::Tiff { .. } => Err(CodecError::DisabledFormat(ImageFormat::Tiff)),

            #[cfg(feature = "bmp")]
            CodecSettings::Bmp => crate::codecs::bmp::encode(image, sink),
            #[cfg(not(feature = "bmp"))]
            CodecSettings::Bmp => Err(CodecError::DisabledFormat(ImageFormat::Bmp)),

            #[cfg(feature = "pdf")]
            CodecSettings::Pdf { quality } => crate::codecs::pdf::encode(image, *quality, sink),
            #[cfg(not(feature = "pdf"))]
            CodecSettings::Pdf { .. } => Err(CodecError::DisabledFormat(ImageFormat::Pdf)),
        }
    }
}

impl fmt::Debug for CodecSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecSettings::Jpeg { quality } => {
                f.debug_struct("Jpeg").field("quality", quality).finish()
            }
            CodecSettings::Png { compression } => {
                f.debug_struct("Png").field("compression", compression).finish()
            }
            CodecSettings::Gif {
                num_colors,
                quantizer,
                drawer,
            } => f
                .debug_struct("Gif")
                .field("num_colors", num_colors)
                .field("quantizer", &quantizer.as_ref().map(|q| q.name()))
                .field("drawer", drawer)
                .finish(),
            CodecSettings::Tiff { compression } => {
                f.debug_struct("Tiff").field("compression", compression).finish()
            }
            CodecSettings::Bmp => f.write_str("Bmp"),
            CodecSettings::Pdf { quality } => {
                f.debug_struct("Pdf").field("quality", quality).finish()
            }
        }
    }
}

/// Target format plus the options to encode it with.
///
/// # Example
///
/// ```no_run
/// use imgconv::{EncodeOption, FormatOption, PixelData};
/// use imgconv::pixel::{ImgVec, Rgb};
///
/// let image = PixelData::Rgb8(ImgVec::new(vec![Rgb::new(0u8, 0, 0); 100 * 100], 100, 100));
/// let output = FormatOption::from_extension("jpg")?
///     .with_option(EncodeOption::Quality(85))
///     .encode(&image)?;
/// # Ok::<(), imgconv::CodecError>(())
/// ```
#[derive(Clone, Debug)]
pub struct FormatOption<'a> {
    format: ImageFormat,
    options: Vec<EncodeOption>,
    registry: Option<&'a CodecRegistry>,
}

impl<'a> FormatOption<'a> {
    /// Encode to `format` with default settings.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            options: Vec::new(),
            registry: None,
        }
    }

    /// Target format chosen by file extension.
    pub fn from_extension(ext: &str) -> Result<Self, CodecError> {
        ImageFormat::from_extension(ext).map(Self::new)
    }

    /// Target format chosen by a file name's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        ImageFormat::from_path(path).map(Self::new)
    }

    /// Target format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Options in the order they will be applied.
    pub fn options(&self) -> &[EncodeOption] {
        &self.options
    }

    /// Append one option. Later options override earlier ones on the same field.
    pub fn with_option(mut self, option: EncodeOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append several options, in order.
    pub fn with_options(mut self, options: impl IntoIterator<Item = EncodeOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Set a codec registry to control which formats are enabled.
    pub fn with_registry(mut self, registry: &'a CodecRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build a fresh configuration from the defaults and this option list.
    pub fn config(&self) -> EncodeConfig {
        EncodeConfig::from_options(&self.options)
    }

    /// Resolve the per-codec settings, checking the format is encodable and enabled.
    pub fn settings(&self) -> Result<CodecSettings, CodecError> {
        if !self.format.can_encode() {
            return Err(CodecError::UnsupportedFormat(self.format.to_string()));
        }
        let default_registry = CodecRegistry::all();
        let registry = self.registry.unwrap_or(&default_registry);
        if !registry.can_encode(self.format) {
            return Err(CodecError::DisabledFormat(self.format));
        }
        CodecSettings::resolve(self.format, &self.config())
    }

    /// Encode `image` into `sink`.
    ///
    /// On failure the sink may hold a truncated prefix of the output.
    pub fn encode_to(&self, sink: &mut impl Write, image: &PixelData) -> Result<(), CodecError> {
        let settings = self.settings()?;
        tracing::debug!(
            format = %self.format,
            width = image.width(),
            height = image.height(),
            ?settings,
            "encoding image"
        );
        settings.encode(image, sink)
    }

    /// Encode `image` into a new buffer.
    pub fn encode(&self, image: &PixelData) -> Result<EncodeOutput, CodecError> {
        let mut data = Vec::new();
        self.encode_to(&mut data, image)?;
        Ok(EncodeOutput {
            data,
            format: self.format,
        })
    }
}

/// Encode by stable format ordinal (`0..=5`, see [`ImageFormat::ordinal`]).
///
/// Any other ordinal fails with [`CodecError::UnsupportedFormat`].
pub fn encode_ordinal(
    ordinal: i32,
    options: &[EncodeOption],
    sink: &mut impl Write,
    image: &PixelData,
) -> Result<(), CodecError> {
    let format = ImageFormat::from_ordinal(ordinal)
        .ok_or_else(|| CodecError::UnsupportedFormat(format!("format ordinal {ordinal}")))?;
    FormatOption::new(format)
        .with_options(options.iter().cloned())
        .encode_to(sink, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{ImgVec, Rgb};

    fn small_image() -> PixelData {
        let buf = (0..16 * 16).map(|i| Rgb::new(i as u8, 0, 255 - i as u8)).collect();
        PixelData::Rgb8(ImgVec::new(buf, 16, 16))
    }

    #[test]
    fn builder_pattern() {
        let request = FormatOption::new(ImageFormat::Jpeg)
            .with_option(EncodeOption::Quality(85))
            .with_options([EncodeOption::GifNumColors(16)]);

        assert_eq!(request.format(), ImageFormat::Jpeg);
        assert_eq!(request.options().len(), 2);
        let config = request.config();
        assert_eq!(config.quality, 85);
        assert_eq!(config.gif_num_colors, 16);
    }

    #[test]
    fn quality_clamping() {
        assert_eq!(clamp_quality(0), 1);
        assert_eq!(clamp_quality(-20), 1);
        assert_eq!(clamp_quality(75), 75);
        assert_eq!(clamp_quality(500), 100);
    }

    #[test]
    fn gif_colors_out_of_range_reset() {
        assert_eq!(gif_num_colors(0), 256);
        assert_eq!(gif_num_colors(-5), 256);
        assert_eq!(gif_num_colors(257), 256);
        assert_eq!(gif_num_colors(1), 1);
        assert_eq!(gif_num_colors(16), 16);
    }

    #[test]
    fn settings_project_only_relevant_fields() {
        let config = EncodeConfig::default()
            .with_quality(500)
            .with_gif_num_colors(0)
            .with_tiff_compression(TiffCompression::Deflate);

        assert!(matches!(
            CodecSettings::resolve(ImageFormat::Jpeg, &config),
            Ok(CodecSettings::Jpeg { quality: 100 })
        ));
        assert!(matches!(
            CodecSettings::resolve(ImageFormat::Pdf, &config),
            Ok(CodecSettings::Pdf { quality: 100 })
        ));
        assert!(matches!(
            CodecSettings::resolve(ImageFormat::Gif, &config),
            Ok(CodecSettings::Gif {
                num_colors: 256,
                quantizer: None,
                drawer: GifDrawer::FloydSteinberg,
            })
        ));
        assert!(matches!(
            CodecSettings::resolve(ImageFormat::Tiff, &config),
            Ok(CodecSettings::Tiff {
                compression: TiffCompression::Deflate
            })
        ));
        assert!(matches!(
            CodecSettings::resolve(ImageFormat::Bmp, &config),
            Ok(CodecSettings::Bmp)
        ));
    }

    #[test]
    fn settings_format_matches() {
        let config = EncodeConfig::default();
        for format in ImageFormat::ENCODABLE {
            let settings = CodecSettings::resolve(format, &config).unwrap();
            assert_eq!(settings.format(), format);
        }
    }

    #[test]
    fn webp_is_unsupported() {
        let result = FormatOption::new(ImageFormat::WebP).encode(&small_image());
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
    }

    #[test]
    fn disabled_format_error() {
        let registry = CodecRegistry::all().with_encode(ImageFormat::Png, false);
        let result = FormatOption::new(ImageFormat::Png)
            .with_registry(&registry)
            .encode(&small_image());
        assert!(matches!(
            result,
            Err(CodecError::DisabledFormat(ImageFormat::Png))
        ));
    }

    #[test]
    fn invalid_ordinal_is_unsupported() {
        let mut sink = Vec::new();
        for ordinal in [-1, 6, 99] {
            let result = encode_ordinal(ordinal, &[], &mut sink, &small_image());
            assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
        }
        assert!(sink.is_empty());
    }

    #[cfg(feature = "png")]
    #[test]
    fn ordinal_and_format_agree() {
        let image = small_image();
        let mut by_ordinal = Vec::new();
        encode_ordinal(1, &[], &mut by_ordinal, &image).unwrap();
        let by_format = FormatOption::new(ImageFormat::Png).encode(&image).unwrap();
        assert_eq!(by_ordinal, by_format.data);
        assert_eq!(by_format.format, ImageFormat::Png);
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn options_reach_the_codec() {
        let image = small_image();
        let low = FormatOption::new(ImageFormat::Jpeg)
            .with_option(EncodeOption::Quality(5))
            .encode(&image)
            .unwrap();
        let high = FormatOption::new(ImageFormat::Jpeg)
            .with_options([EncodeOption::Quality(5), EncodeOption::Quality(98)])
            .encode(&image)
            .unwrap();
        assert!(low.data.len() < high.data.len());
    }

    #[test]
    fn from_path_picks_format() {
        let option = FormatOption::from_path("out/picture.TIFF").unwrap();
        assert_eq!(option.format(), ImageFormat::Tiff);
        assert!(FormatOption::from_path("notes.txt").is_err());
    }
}
