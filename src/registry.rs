//! Per-call switches for which codecs may run.
//!
//! Cargo features decide what is compiled; a [`CodecRegistry`] narrows that
//! further for a single encode or decode.

use crate::ImageFormat;

/// One bit per [`ImageFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatSet(u8);

impl FormatSet {
    const EMPTY: Self = FormatSet(0);

    fn bit(format: ImageFormat) -> u8 {
        match format {
            ImageFormat::Jpeg => 1 << 0,
            ImageFormat::Png => 1 << 1,
            ImageFormat::Gif => 1 << 2,
            ImageFormat::Tiff => 1 << 3,
            ImageFormat::Bmp => 1 << 4,
            ImageFormat::Pdf => 1 << 5,
            ImageFormat::WebP => 1 << 6,
        }
    }

    fn all_compiled() -> Self {
        let mut set = Self::EMPTY;
        for format in ImageFormat::ALL {
            if is_compiled(format) {
                set.insert(format);
            }
        }
        set
    }

    fn contains(self, format: ImageFormat) -> bool {
        (self.0 & Self::bit(format)) != 0
    }

    fn insert(&mut self, format: ImageFormat) {
        self.0 |= Self::bit(format);
    }

    fn remove(&mut self, format: ImageFormat) {
        self.0 &= !Self::bit(format);
    }

    fn iter(self) -> impl Iterator<Item = ImageFormat> {
        ImageFormat::ALL.into_iter().filter(move |&f| self.contains(f))
    }
}

/// Whether the codec for `format` was compiled in.
fn is_compiled(format: ImageFormat) -> bool {
    match format {
        ImageFormat::Jpeg => cfg!(feature = "jpeg"),
        ImageFormat::Png => cfg!(feature = "png"),
        ImageFormat::Gif => cfg!(feature = "gif"),
        ImageFormat::Tiff => cfg!(feature = "tiff"),
        ImageFormat::Bmp => cfg!(feature = "bmp"),
        ImageFormat::Pdf => cfg!(feature = "pdf"),
        ImageFormat::WebP => cfg!(feature = "webp"),
    }
}

/// Which formats may be decoded and encoded.
///
/// A format passes only when its feature is compiled in and it is switched on here.
#[derive(Clone, Debug)]
pub struct CodecRegistry {
    decode_enabled: FormatSet,
    encode_enabled: FormatSet,
}

impl CodecRegistry {
    /// Every compiled codec switched on.
    pub fn all() -> Self {
        Self {
            decode_enabled: FormatSet::all_compiled(),
            encode_enabled: FormatSet::all_compiled(),
        }
    }

    /// Every codec switched off.
    pub fn none() -> Self {
        Self {
            decode_enabled: FormatSet::EMPTY,
            encode_enabled: FormatSet::EMPTY,
        }
    }

    /// Switch decoding of `format` on or off.
    pub fn with_decode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.decode_enabled.insert(format);
        } else {
            self.decode_enabled.remove(format);
        }
        self
    }

    /// Switch encoding of `format` on or off.
    pub fn with_encode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.encode_enabled.insert(format);
        } else {
            self.encode_enabled.remove(format);
        }
        self
    }

    /// Whether `format` may be decoded.
    pub fn can_decode(&self, format: ImageFormat) -> bool {
        self.decode_enabled.contains(format) && is_compiled(format)
    }

    /// Whether `format` may be encoded. Never true for WebP.
    pub fn can_encode(&self, format: ImageFormat) -> bool {
        format.can_encode() && self.encode_enabled.contains(format) && is_compiled(format)
    }

    /// Decodable formats, in [`ImageFormat::ALL`] order.
    pub fn decodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.decode_enabled.iter().filter(|&f| self.can_decode(f))
    }

    /// Encodable formats, in ordinal order.
    pub fn encodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.encode_enabled.iter().filter(|&f| self.can_encode(f))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_everything_compiled() {
        let registry = CodecRegistry::default();

        #[cfg(feature = "jpeg")]
        assert!(registry.can_decode(ImageFormat::Jpeg));
        #[cfg(feature = "tiff")]
        assert!(registry.can_encode(ImageFormat::Tiff));
        #[cfg(feature = "webp")]
        assert!(registry.can_decode(ImageFormat::WebP));
    }

    #[test]
    fn webp_never_encodes() {
        let registry = CodecRegistry::all().with_encode(ImageFormat::WebP, true);
        assert!(!registry.can_encode(ImageFormat::WebP));
        assert!(registry.encodable_formats().all(|f| f != ImageFormat::WebP));
    }

    #[test]
    fn empty_registry_allows_nothing() {
        let registry = CodecRegistry::none();

        for format in ImageFormat::ALL {
            assert!(!registry.can_decode(format));
            assert!(!registry.can_encode(format));
        }
        assert_eq!(registry.decodable_formats().count(), 0);
    }

    #[test]
    fn selective_enable() {
        let registry = CodecRegistry::none()
            .with_decode(ImageFormat::Jpeg, true)
            .with_encode(ImageFormat::Bmp, true);

        #[cfg(feature = "jpeg")]
        assert!(registry.can_decode(ImageFormat::Jpeg));
        #[cfg(feature = "bmp")]
        assert!(registry.can_encode(ImageFormat::Bmp));

        assert!(!registry.can_decode(ImageFormat::Png));
        assert!(!registry.can_encode(ImageFormat::Jpeg));
    }

    #[test]
    fn switching_off_one_direction() {
        let registry = CodecRegistry::all().with_decode(ImageFormat::Gif, false);
        assert!(!registry.can_decode(ImageFormat::Gif));
        #[cfg(feature = "gif")]
        assert!(registry.can_encode(ImageFormat::Gif));
    }

    #[cfg(all(
        feature = "jpeg",
        feature = "png",
        feature = "gif",
        feature = "tiff",
        feature = "bmp",
        feature = "pdf"
    ))]
    #[test]
    fn encodable_in_ordinal_order() {
        let formats: Vec<_> = CodecRegistry::all().encodable_formats().collect();
        assert_eq!(formats, ImageFormat::ENCODABLE.to_vec());
    }
}
