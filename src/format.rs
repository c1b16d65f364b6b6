//! Image format identifiers, extension table and magic-byte detection.

use std::fmt;
use std::path::Path;

use crate::CodecError;

/// Supported image formats.
///
/// The encode-capable formats carry stable ordinals (`Jpeg = 0` through
/// `Pdf = 5`). [`ImageFormat::WebP`] can only be decoded and has no ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Bmp,
    Pdf,
    WebP,
}

impl ImageFormat {
    /// Formats that can be encoded, in ordinal order.
    pub const ENCODABLE: [ImageFormat; 6] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::Tiff,
        ImageFormat::Bmp,
        ImageFormat::Pdf,
    ];

    /// Every known format, decode-only ones included.
    pub const ALL: [ImageFormat; 7] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::Tiff,
        ImageFormat::Bmp,
        ImageFormat::Pdf,
        ImageFormat::WebP,
    ];

    /// Stable ordinal of an encode-capable format.
    pub fn ordinal(self) -> Option<i32> {
        match self {
            ImageFormat::Jpeg => Some(0),
            ImageFormat::Png => Some(1),
            ImageFormat::Gif => Some(2),
            ImageFormat::Tiff => Some(3),
            ImageFormat::Bmp => Some(4),
            ImageFormat::Pdf => Some(5),
            ImageFormat::WebP => None,
        }
    }

    /// Format for a stable ordinal, `None` outside `0..=5`.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ENCODABLE.get(i).copied())
    }

    /// Resolve a file extension (case-insensitive, optional leading dot).
    ///
    /// Each encode-capable format resolves from its canonical extension.
    /// `jpeg`, `jpe`, `jfif` and `tiff` are accepted as synonyms. WebP has no
    /// encoder and does not resolve.
    pub fn from_extension(ext: &str) -> Result<Self, CodecError> {
        let lower = ext.trim_start_matches('.').to_ascii_lowercase();
        match lower.as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "gif" => Ok(ImageFormat::Gif),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            "bmp" => Ok(ImageFormat::Bmp),
            "pdf" => Ok(ImageFormat::Pdf),
            _ => Err(CodecError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Resolve the format from a file name's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    /// Canonical extension (lower-case, no dot). `None` for decode-only formats.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ImageFormat::Jpeg => Some("jpg"),
            ImageFormat::Png => Some("png"),
            ImageFormat::Gif => Some("gif"),
            ImageFormat::Tiff => Some("tif"),
            ImageFormat::Bmp => Some("bmp"),
            ImageFormat::Pdf => Some("pdf"),
            ImageFormat::WebP => None,
        }
    }

    /// All extensions that resolve to this format, canonical first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Tiff => &["tif", "tiff"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Pdf => &["pdf"],
            ImageFormat::WebP => &[],
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Pdf => "application/pdf",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Whether an encoder exists for this format.
    pub fn can_encode(self) -> bool {
        self.ordinal().is_some()
    }

    /// Whether this format can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        match self {
            ImageFormat::Jpeg => false,
            ImageFormat::Png => true,
            ImageFormat::Gif => true,
            ImageFormat::Tiff => true,
            ImageFormat::Bmp => true,
            ImageFormat::Pdf => false,
            ImageFormat::WebP => true,
        }
    }

    /// Whether pixels survive an encode/decode round trip unchanged.
    ///
    /// GIF is lossless only while the palette holds every color.
    pub fn supports_lossless(self) -> bool {
        match self {
            ImageFormat::Jpeg => false,
            ImageFormat::Png => true,
            ImageFormat::Gif => true,
            ImageFormat::Tiff => true,
            ImageFormat::Bmp => true,
            ImageFormat::Pdf => false,
            ImageFormat::WebP => true,
        }
    }

    /// Detect format from magic bytes. Returns None if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        // GIF: "GIF87a" or "GIF89a"
        if data.len() >= 6
            && &data[..4] == b"GIF8"
            && (data[4] == b'7' || data[4] == b'9')
            && data[5] == b'a'
        {
            return Some(ImageFormat::Gif);
        }

        // TIFF: little-endian "II*\0" or big-endian "MM\0*"
        if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            return Some(ImageFormat::Tiff);
        }

        // BMP: "BM" followed by a 4-byte file size and two reserved words
        if data.len() >= 14 && data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        if data.starts_with(b"%PDF-") {
            return Some(ImageFormat::Pdf);
        }

        // WebP: "RIFF....WEBP"
        if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Pdf => "PDF",
            ImageFormat::WebP => "WebP",
        };
        f.write_str(name)
    }
}

/// Canonical extension for a format ordinal.
///
/// Fails with [`CodecError::UnknownFormat`] when the ordinal is outside the
/// enumerated range, e.g. the `-1` "no format" sentinel.
pub fn extension_of(ordinal: i32) -> Result<&'static str, CodecError> {
    ImageFormat::from_ordinal(ordinal)
        .and_then(ImageFormat::extension)
        .ok_or(CodecError::UnknownFormat(ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn detect_png() {
        let data = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
        ];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Png));
    }

    #[test]
    fn detect_gif() {
        let data = b"GIF89a\x00\x00\x00\x00\x00\x00";
        assert_eq!(ImageFormat::detect(data), Some(ImageFormat::Gif));
    }

    #[test]
    fn detect_tiff_both_byte_orders() {
        assert_eq!(ImageFormat::detect(b"II*\0\x08\0\0\0"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::detect(b"MM\0*\0\0\0\x08"), Some(ImageFormat::Tiff));
    }

    #[test]
    fn detect_bmp() {
        let data = b"BM\x46\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00";
        assert_eq!(ImageFormat::detect(data), Some(ImageFormat::Bmp));
    }

    #[test]
    fn detect_pdf() {
        assert_eq!(ImageFormat::detect(b"%PDF-1.5\n"), Some(ImageFormat::Pdf));
    }

    #[test]
    fn detect_webp() {
        let data = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(ImageFormat::detect(data), Some(ImageFormat::WebP));
    }

    #[test]
    fn detect_too_short() {
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8]), None);
        assert_eq!(ImageFormat::detect(b"BM"), None);
        assert_eq!(ImageFormat::detect(b"Hello"), None);
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("Jpg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("PNG").unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension(".tif").unwrap(), ImageFormat::Tiff);
    }

    #[test]
    fn from_extension_synonyms() {
        assert_eq!(ImageFormat::from_extension("jpeg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("TIFF").unwrap(), ImageFormat::Tiff);
    }

    #[test]
    fn from_extension_unsupported() {
        assert!(matches!(
            ImageFormat::from_extension("txt"),
            Err(CodecError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ImageFormat::from_extension("webp"),
            Err(CodecError::UnsupportedFormat(_))
        ));
        assert!(ImageFormat::from_extension("").is_err());
    }

    #[test]
    fn extension_bijection() {
        for format in ImageFormat::ENCODABLE {
            let ext = format.extension().unwrap();
            assert_eq!(ImageFormat::from_extension(ext).unwrap(), format);
            assert_eq!(format.extensions()[0], ext);
        }
    }

    #[test]
    fn synonyms_never_collide() {
        for a in ImageFormat::ALL {
            for b in ImageFormat::ALL {
                if a == b {
                    continue;
                }
                for ext in a.extensions() {
                    assert!(!b.extensions().contains(ext), "{ext} shared by {a} and {b}");
                }
            }
        }
    }

    #[test]
    fn ordinals_are_stable() {
        assert_eq!(ImageFormat::Jpeg.ordinal(), Some(0));
        assert_eq!(ImageFormat::Pdf.ordinal(), Some(5));
        assert_eq!(ImageFormat::WebP.ordinal(), None);
        for format in ImageFormat::ENCODABLE {
            let ordinal = format.ordinal().unwrap();
            assert_eq!(ImageFormat::from_ordinal(ordinal), Some(format));
        }
        assert_eq!(ImageFormat::from_ordinal(-1), None);
        assert_eq!(ImageFormat::from_ordinal(6), None);
    }

    #[test]
    fn extension_of_ordinal() {
        assert_eq!(extension_of(0).unwrap(), "jpg");
        assert_eq!(extension_of(3).unwrap(), "tif");
        assert!(matches!(extension_of(-1), Err(CodecError::UnknownFormat(-1))));
        assert!(matches!(extension_of(42), Err(CodecError::UnknownFormat(42))));
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(
            ImageFormat::from_path("out/photo.JPG").unwrap(),
            ImageFormat::Jpeg
        );
        assert!(ImageFormat::from_path("README").is_err());
        assert!(ImageFormat::from_path("notes.txt").is_err());
    }
}
