//! # imgconv
//!
//! Image format conversion over JPEG, PNG, GIF, TIFF, BMP and PDF encoders,
//! with WebP as a decode-only source.
//!
//! Each codec is feature-gated. Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! imgconv = { version = "0.1", default-features = false, features = ["jpeg", "png"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use imgconv::{DecodeRequest, EncodeOption, FormatOption, ImageFormat};
//!
//! // Detect and decode
//! let data: &[u8] = &[]; // your image bytes
//! let decoded = DecodeRequest::new(data).decode()?;
//!
//! // Encode to a format picked from a file extension
//! let jpeg = FormatOption::from_extension("jpg")?
//!     .with_option(EncodeOption::Quality(85))
//!     .encode(&decoded.pixels)?;
//! assert_eq!(jpeg.format, ImageFormat::Jpeg);
//! # Ok::<(), imgconv::CodecError>(())
//! ```
//!
//! Options are applied in order and the last one touching a field wins.
//! Every encode call builds its own configuration, so concurrent calls never
//! share state.

#![forbid(unsafe_code)]

mod codecs;
pub mod config;
mod decode;
mod encode;
mod error;
mod format;
mod info;
mod limits;
#[cfg(feature = "jpeg")]
pub mod normalize;
pub mod pixel;
pub mod quantize;
mod registry;

pub use config::{
    EncodeConfig, EncodeOption, GifDrawer, PngCompression, TiffCompression,
};
pub use decode::{DecodeOutput, DecodeRequest, decode_from};
pub use encode::{CodecSettings, EncodeOutput, FormatOption, encode_ordinal};
pub use error::{BoxError, CodecError, UnrecognizedFormat};
pub use format::{ImageFormat, extension_of};
pub use info::ImageInfo;
pub use limits::Limits;
pub use pixel::PixelData;
#[cfg(feature = "gif")]
pub use quantize::NeuQuantizer;
pub use quantize::Quantizer;
pub use registry::CodecRegistry;
