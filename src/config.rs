//! Encoder configuration.
//!
//! [`EncodeConfig`] holds one field per tunable parameter across every
//! encode-capable format. Callers tune it with an ordered list of
//! [`EncodeOption`] records; each record owns exactly one field, and when two
//! records touch the same field the one applied last wins.
//!
//! ```
//! use imgconv::config::{EncodeConfig, EncodeOption, TiffCompression};
//!
//! let config = EncodeConfig::from_options(&[
//!     EncodeOption::Quality(50),
//!     EncodeOption::TiffCompressionType(TiffCompression::Deflate),
//!     EncodeOption::Quality(90),
//! ]);
//! assert_eq!(config.quality, 90);
//! assert_eq!(config.tiff_compression, TiffCompression::Deflate);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::quantize::Quantizer;

/// Default JPEG and PDF quality.
pub const DEFAULT_QUALITY: i32 = 75;

/// Default maximum GIF palette size.
pub const DEFAULT_GIF_NUM_COLORS: i32 = 256;

/// TIFF compression scheme.
///
/// The first six variants keep the stable ordinals `0..=5`. Schemes the TIFF
/// encoder has no native constant for are written uncompressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TiffCompression {
    Uncompressed,
    Deflate,
    #[default]
    Lzw,
    CcittGroup3,
    CcittGroup4,
    Jpeg,
    /// PackBits run-length encoding.
    Packbits,
}

impl TiffCompression {
    /// Scheme for an ordinal; unknown ordinals fall back to uncompressed.
    pub fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            1 => TiffCompression::Deflate,
            2 => TiffCompression::Lzw,
            3 => TiffCompression::CcittGroup3,
            4 => TiffCompression::CcittGroup4,
            5 => TiffCompression::Jpeg,
            6 => TiffCompression::Packbits,
            _ => TiffCompression::Uncompressed,
        }
    }

    /// Whether the horizontal differencing predictor applies to this scheme.
    pub fn uses_predictor(self) -> bool {
        matches!(self, TiffCompression::Lzw | TiffCompression::Deflate)
    }
}

/// PNG compression level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PngCompression {
    #[default]
    Default,
    None,
    BestSpeed,
    BestCompression,
}

/// How source pixels are mapped onto the quantized GIF palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GifDrawer {
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Each pixel takes its nearest palette entry.
    Nearest,
}

/// One configuration mutation. Each variant owns a single [`EncodeConfig`] field.
#[derive(Clone)]
#[non_exhaustive]
pub enum EncodeOption {
    /// JPEG and PDF quality, 1-100, higher is better.
    Quality(i32),
    /// Maximum number of GIF palette colors, 1-256.
    GifNumColors(i32),
    /// Quantizer producing the GIF palette. `None` selects the codec default.
    GifQuantizer(Option<Arc<dyn Quantizer>>),
    /// Drawer mapping pixels onto the GIF palette. `None` selects the codec default.
    GifDrawer(Option<GifDrawer>),
    /// PNG compression level.
    PngCompressionLevel(PngCompression),
    /// TIFF compression scheme.
    TiffCompressionType(TiffCompression),
}

impl EncodeOption {
    /// Apply this option to a configuration.
    ///
    /// No validation happens here; out-of-range values are handled by the codec.
    pub fn apply(&self, config: &mut EncodeConfig) {
        match self {
            EncodeOption::Quality(q) => config.quality = *q,
            EncodeOption::GifNumColors(n) => config.gif_num_colors = *n,
            EncodeOption::GifQuantizer(q) => config.gif_quantizer = q.clone(),
            EncodeOption::GifDrawer(d) => config.gif_drawer = *d,
            EncodeOption::PngCompressionLevel(level) => config.png_compression = *level,
            EncodeOption::TiffCompressionType(c) => config.tiff_compression = *c,
        }
    }
}

impl fmt::Debug for EncodeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeOption::Quality(q) => f.debug_tuple("Quality").field(q).finish(),
            EncodeOption::GifNumColors(n) => f.debug_tuple("GifNumColors").field(n).finish(),
            EncodeOption::GifQuantizer(q) => f
                .debug_tuple("GifQuantizer")
                .field(&q.as_ref().map(|q| q.name()))
                .finish(),
            EncodeOption::GifDrawer(d) => f.debug_tuple("GifDrawer").field(d).finish(),
            EncodeOption::PngCompressionLevel(l) => {
                f.debug_tuple("PngCompressionLevel").field(l).finish()
            }
            EncodeOption::TiffCompressionType(c) => {
                f.debug_tuple("TiffCompressionType").field(c).finish()
            }
        }
    }
}

/// Every tunable encoder parameter.
///
/// Each format reads only its own fields; see [`crate::encode::CodecSettings`].
#[derive(Clone)]
pub struct EncodeConfig {
    /// JPEG and PDF quality (1-100). Default 75.
    pub quality: i32,
    /// Maximum GIF palette size (1-256). Default 256.
    pub gif_num_colors: i32,
    /// GIF palette quantizer. `None` selects the codec default.
    pub gif_quantizer: Option<Arc<dyn Quantizer>>,
    /// GIF palette drawer. `None` selects the codec default.
    pub gif_drawer: Option<GifDrawer>,
    /// PNG compression level.
    pub png_compression: PngCompression,
    /// TIFF compression scheme. Default LZW.
    pub tiff_compression: TiffCompression,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            gif_num_colors: DEFAULT_GIF_NUM_COLORS,
            gif_quantizer: None,
            gif_drawer: None,
            png_compression: PngCompression::Default,
            tiff_compression: TiffCompression::Lzw,
        }
    }
}

impl EncodeConfig {
    /// Start from the defaults and apply `options` in order.
    pub fn from_options<'a>(options: impl IntoIterator<Item = &'a EncodeOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Set JPEG and PDF quality.
    pub fn with_quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }

    /// Set the maximum GIF palette size.
    pub fn with_gif_num_colors(mut self, num_colors: i32) -> Self {
        self.gif_num_colors = num_colors;
        self
    }

    /// Set the GIF palette quantizer.
    pub fn with_gif_quantizer(mut self, quantizer: impl Quantizer + 'static) -> Self {
        self.gif_quantizer = Some(Arc::new(quantizer));
        self
    }

    /// Set the GIF palette drawer.
    pub fn with_gif_drawer(mut self, drawer: GifDrawer) -> Self {
        self.gif_drawer = Some(drawer);
        self
    }

    /// Set the PNG compression level.
    pub fn with_png_compression(mut self, level: PngCompression) -> Self {
        self.png_compression = level;
        self
    }

    /// Set the TIFF compression scheme.
    pub fn with_tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = compression;
        self
    }
}

impl fmt::Debug for EncodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeConfig")
            .field("quality", &self.quality)
            .field("gif_num_colors", &self.gif_num_colors)
            .field(
                "gif_quantizer",
                &self.gif_quantizer.as_ref().map(|q| q.name()),
            )
            .field("gif_drawer", &self.gif_drawer)
            .field("png_compression", &self.png_compression)
            .field("tiff_compression", &self.tiff_compression)
            .finish()
    }
}
