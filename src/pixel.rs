//! Typed pixel buffers.
//!
//! Uses `imgref::ImgVec` for 2D pixel data with typed pixels from the `rgb` crate.
//! Alpha is straight (not premultiplied).

pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::{Gray, GrayAlpha, Rgb, Rgba};

/// Decoded image pixels in one of the supported 8-bit layouts.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum PixelData {
    Rgb8(ImgVec<Rgb<u8>>),
    Rgba8(ImgVec<Rgba<u8>>),
    Gray8(ImgVec<Gray<u8>>),
    GrayAlpha8(ImgVec<GrayAlpha<u8>>),
}

impl PixelData {
    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            PixelData::Rgb8(img) => img.width() as u32,
            PixelData::Rgba8(img) => img.width() as u32,
            PixelData::Gray8(img) => img.width() as u32,
            PixelData::GrayAlpha8(img) => img.width() as u32,
        }
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            PixelData::Rgb8(img) => img.height() as u32,
            PixelData::Rgba8(img) => img.height() as u32,
            PixelData::Gray8(img) => img.height() as u32,
            PixelData::GrayAlpha8(img) => img.height() as u32,
        }
    }

    /// Whether the layout carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        matches!(self, PixelData::Rgba8(_) | PixelData::GrayAlpha8(_))
    }

    /// Whether every pixel is fully opaque. Always true without an alpha channel.
    pub fn is_opaque(&self) -> bool {
        match self {
            PixelData::Rgba8(img) => img.pixels().all(|p| p.a == u8::MAX),
            PixelData::GrayAlpha8(img) => img.pixels().all(|p| p.a == u8::MAX),
            PixelData::Rgb8(_) | PixelData::Gray8(_) => true,
        }
    }

    /// Convert to a contiguous RGBA8 image.
    pub fn to_rgba8(&self) -> ImgVec<Rgba<u8>> {
        match self {
            PixelData::Rgba8(img) => map_pixels(img.as_ref(), |p| p),
            PixelData::Rgb8(img) => map_pixels(img.as_ref(), |p| p.with_alpha(u8::MAX)),
            PixelData::Gray8(img) => map_pixels(img.as_ref(), |p| {
                let v = p.value();
                Rgba::new(v, v, v, u8::MAX)
            }),
            PixelData::GrayAlpha8(img) => {
                map_pixels(img.as_ref(), |p| Rgba::new(p.v, p.v, p.v, p.a))
            }
        }
    }

    /// Convert to a contiguous RGB8 image, dropping alpha without compositing.
    pub fn to_rgb8(&self) -> ImgVec<Rgb<u8>> {
        match self {
            PixelData::Rgb8(img) => map_pixels(img.as_ref(), |p| p),
            PixelData::Rgba8(img) => map_pixels(img.as_ref(), |p| p.rgb()),
            PixelData::Gray8(img) => map_pixels(img.as_ref(), |p| {
                let v = p.value();
                Rgb::new(v, v, v)
            }),
            PixelData::GrayAlpha8(img) => map_pixels(img.as_ref(), |p| Rgb::new(p.v, p.v, p.v)),
        }
    }
}

impl From<ImgVec<Rgb<u8>>> for PixelData {
    fn from(img: ImgVec<Rgb<u8>>) -> Self {
        PixelData::Rgb8(img)
    }
}

impl From<ImgVec<Rgba<u8>>> for PixelData {
    fn from(img: ImgVec<Rgba<u8>>) -> Self {
        PixelData::Rgba8(img)
    }
}

impl From<ImgVec<Gray<u8>>> for PixelData {
    fn from(img: ImgVec<Gray<u8>>) -> Self {
        PixelData::Gray8(img)
    }
}

impl From<ImgVec<GrayAlpha<u8>>> for PixelData {
    fn from(img: ImgVec<GrayAlpha<u8>>) -> Self {
        PixelData::GrayAlpha8(img)
    }
}

/// Copy an image (honoring its stride) into a contiguous buffer of another pixel type.
pub(crate) fn map_pixels<T: Copy, U>(img: ImgRef<'_, T>, f: impl Fn(T) -> U) -> ImgVec<U> {
    let buf: Vec<U> = img.pixels().map(f).collect();
    ImgVec::new(buf, img.width(), img.height())
}

/// Build a typed image from tightly packed bytes.
///
/// Returns `None` for zero width or if the byte count does not match
/// `width * height * size_of::<P>()`.
pub(crate) fn from_bytes<P: bytemuck::Pod>(bytes: &[u8], width: u32, height: u32) -> Option<ImgVec<P>> {
    let (w, h) = (width as usize, height as usize);
    if w == 0 {
        return None;
    }
    let expected = w.checked_mul(h)?.checked_mul(core::mem::size_of::<P>())?;
    if bytes.len() != expected {
        return None;
    }
    let pixels: Vec<P> = bytemuck::pod_collect_to_vec(bytes);
    Some(ImgVec::new(pixels, w, h))
}

/// Flatten an image into tightly packed bytes, dropping any stride padding.
pub(crate) fn to_bytes<P: bytemuck::Pod>(img: ImgRef<'_, P>) -> Vec<u8> {
    let (buf, _, _) = img.to_contiguous_buf();
    bytemuck::cast_slice(buf.as_ref()).to_vec()
}
