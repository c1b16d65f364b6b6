//! Pixel representation normalization ahead of JPEG encoding.
//!
//! JPEG has no alpha channel. An image that carries one but is fully opaque is
//! handed to the encoder as an [`OpaqueView`]: a borrowed window over the same
//! buffer, same stride and rectangle, that only ever reads the color bytes.
//! Anything with a translucent pixel is flattened onto black instead.

use image::GenericImageView;

use crate::pixel::{Gray, GrayAlpha, ImgRef, ImgVec, PixelData, Rgb, Rgba, map_pixels};

/// Borrowed, alpha-free view of an image.
///
/// For `Rgba<u8>` and `GrayAlpha<u8>` sources the view can only be built over
/// fully opaque pixels, so dropping alpha loses nothing.
#[derive(Clone, Copy, Debug)]
pub struct OpaqueView<'a, P> {
    img: ImgRef<'a, P>,
}

impl<'a, P> OpaqueView<'a, P> {
    /// The underlying image, stride included.
    pub fn source(&self) -> ImgRef<'a, P> {
        self.img
    }

    #[inline]
    fn at(&self, x: u32, y: u32) -> &'a P {
        let buf: &'a [P] = *self.img.buf();
        &buf[y as usize * self.img.stride() + x as usize]
    }
}

impl<'a> OpaqueView<'a, Rgba<u8>> {
    /// View over `img` if every pixel has alpha 255.
    pub fn from_opaque(img: ImgRef<'a, Rgba<u8>>) -> Option<Self> {
        img.pixels()
            .all(|p| p.a == u8::MAX)
            .then_some(Self { img })
    }
}

impl<'a> OpaqueView<'a, GrayAlpha<u8>> {
    /// View over `img` if every pixel has alpha 255.
    pub fn from_opaque(img: ImgRef<'a, GrayAlpha<u8>>) -> Option<Self> {
        img.pixels()
            .all(|p| p.a == u8::MAX)
            .then_some(Self { img })
    }
}

impl<'a> From<ImgRef<'a, Rgb<u8>>> for OpaqueView<'a, Rgb<u8>> {
    fn from(img: ImgRef<'a, Rgb<u8>>) -> Self {
        Self { img }
    }
}

impl<'a> From<ImgRef<'a, Gray<u8>>> for OpaqueView<'a, Gray<u8>> {
    fn from(img: ImgRef<'a, Gray<u8>>) -> Self {
        Self { img }
    }
}

fn dims<P>(img: ImgRef<'_, P>) -> (u32, u32) {
    (img.width() as u32, img.height() as u32)
}

impl GenericImageView for OpaqueView<'_, Rgba<u8>> {
    type Pixel = image::Rgb<u8>;

    fn dimensions(&self) -> (u32, u32) {
        dims(self.img)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        let p = self.at(x, y);
        image::Rgb([p.r, p.g, p.b])
    }
}

impl GenericImageView for OpaqueView<'_, Rgb<u8>> {
    type Pixel = image::Rgb<u8>;

    fn dimensions(&self) -> (u32, u32) {
        dims(self.img)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        let p = self.at(x, y);
        image::Rgb([p.r, p.g, p.b])
    }
}

impl GenericImageView for OpaqueView<'_, GrayAlpha<u8>> {
    type Pixel = image::Luma<u8>;

    fn dimensions(&self) -> (u32, u32) {
        dims(self.img)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        image::Luma([self.at(x, y).v])
    }
}

impl GenericImageView for OpaqueView<'_, Gray<u8>> {
    type Pixel = image::Luma<u8>;

    fn dimensions(&self) -> (u32, u32) {
        dims(self.img)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        image::Luma([self.at(x, y).value()])
    }
}

/// What the JPEG encoder is handed for a given image.
#[derive(Debug)]
pub enum JpegInput<'a> {
    Rgb(OpaqueView<'a, Rgb<u8>>),
    Gray(OpaqueView<'a, Gray<u8>>),
    /// Opaque RGBA reinterpreted as RGB without copying.
    OpaqueRgba(OpaqueView<'a, Rgba<u8>>),
    /// Opaque gray-alpha reinterpreted as gray without copying.
    OpaqueGrayAlpha(OpaqueView<'a, GrayAlpha<u8>>),
    /// Translucent RGBA composited onto black.
    Flattened(ImgVec<Rgb<u8>>),
    /// Translucent gray-alpha composited onto black.
    FlattenedGray(ImgVec<Gray<u8>>),
}

impl JpegInput<'_> {
    /// Whether the input borrows the caller's buffer.
    pub fn is_view(&self) -> bool {
        !matches!(self, JpegInput::Flattened(_) | JpegInput::FlattenedGray(_))
    }
}

/// Choose the cheapest faithful representation of `image` for JPEG.
pub fn for_jpeg(image: &PixelData) -> JpegInput<'_> {
    match image {
        PixelData::Rgb8(img) => JpegInput::Rgb(img.as_ref().into()),
        PixelData::Gray8(img) => JpegInput::Gray(img.as_ref().into()),
        PixelData::Rgba8(img) => match OpaqueView::<Rgba<u8>>::from_opaque(img.as_ref()) {
            Some(view) => {
                tracing::trace!("opaque RGBA, encoding through RGB view");
                JpegInput::OpaqueRgba(view)
            }
            None => {
                tracing::trace!("translucent RGBA, flattening onto black");
                JpegInput::Flattened(flatten_rgba(img.as_ref()))
            }
        },
        PixelData::GrayAlpha8(img) => match OpaqueView::<GrayAlpha<u8>>::from_opaque(img.as_ref())
        {
            Some(view) => {
                tracing::trace!("opaque gray-alpha, encoding through gray view");
                JpegInput::OpaqueGrayAlpha(view)
            }
            None => {
                tracing::trace!("translucent gray-alpha, flattening onto black");
                JpegInput::FlattenedGray(flatten_gray_alpha(img.as_ref()))
            }
        },
    }
}

/// Scale a straight-alpha channel value by its alpha at 16-bit precision.
#[inline]
fn premultiply(c: u8, a: u8) -> u8 {
    let c = u32::from(c) * 0x101;
    let a = u32::from(a) * 0x101;
    ((c * a / 0xffff) >> 8) as u8
}

/// Composite straight-alpha RGBA onto black.
pub fn flatten_rgba(img: ImgRef<'_, Rgba<u8>>) -> ImgVec<Rgb<u8>> {
    map_pixels(img, |p| {
        Rgb::new(premultiply(p.r, p.a), premultiply(p.g, p.a), premultiply(p.b, p.a))
    })
}

/// Composite straight-alpha gray onto black.
pub fn flatten_gray_alpha(img: ImgRef<'_, GrayAlpha<u8>>) -> ImgVec<Gray<u8>> {
    map_pixels(img, |p| Gray::from(premultiply(p.v, p.a)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_img(w: usize, h: usize) -> ImgVec<Rgba<u8>> {
        let buf = (0..w * h)
            .map(|i| Rgba::new(i as u8, (i * 3) as u8, (i * 7) as u8, 255))
            .collect();
        ImgVec::new(buf, w, h)
    }

    #[test]
    fn opaque_rgba_becomes_view() {
        let img = PixelData::Rgba8(rgba_img(5, 4));
        let input = for_jpeg(&img);
        assert!(input.is_view());
        assert!(matches!(input, JpegInput::OpaqueRgba(_)));
    }

    #[test]
    fn one_translucent_pixel_forbids_view() {
        let mut img = rgba_img(5, 4);
        img.buf_mut()[19].a = 254;
        let img = PixelData::Rgba8(img);
        let input = for_jpeg(&img);
        assert!(!input.is_view());
        assert!(matches!(input, JpegInput::Flattened(_)));
    }

    #[test]
    fn view_reads_color_through_stride() {
        // 2x2 visible region in a 3-wide buffer.
        let buf = vec![
            Rgba::new(1, 2, 3, 255),
            Rgba::new(4, 5, 6, 255),
            Rgba::new(0, 0, 0, 0),
            Rgba::new(7, 8, 9, 255),
            Rgba::new(10, 11, 12, 255),
            Rgba::new(0, 0, 0, 0),
        ];
        let img = ImgVec::new_stride(buf, 2, 2, 3);
        let view = OpaqueView::<Rgba<u8>>::from_opaque(img.as_ref()).unwrap();
        assert_eq!(view.dimensions(), (2, 2));
        assert_eq!(view.get_pixel(1, 1), image::Rgb([10, 11, 12]));
        assert_eq!(view.get_pixel(0, 1), image::Rgb([7, 8, 9]));
        assert_eq!(view.source().stride(), 3);
    }

    #[test]
    fn view_over_sub_image() {
        let img = rgba_img(6, 6);
        let sub = img.sub_image(2, 1, 3, 2);
        let view = OpaqueView::<Rgba<u8>>::from_opaque(sub).unwrap();
        assert_eq!(view.dimensions(), (3, 2));
        let expected = img.buf()[6 + 2];
        assert_eq!(
            view.get_pixel(0, 0),
            image::Rgb([expected.r, expected.g, expected.b])
        );
    }

    #[test]
    fn gray_alpha_view() {
        let buf = vec![Gray::from(40u8).with_alpha(255); 4];
        let img = PixelData::GrayAlpha8(ImgVec::new(buf, 2, 2));
        match for_jpeg(&img) {
            JpegInput::OpaqueGrayAlpha(view) => {
                assert_eq!(view.get_pixel(1, 0), image::Luma([40]));
            }
            other => panic!("expected gray view, got {other:?}"),
        }
    }

    #[test]
    fn flatten_composites_onto_black() {
        let buf = vec![
            Rgba::new(200, 100, 50, 255),
            Rgba::new(200, 100, 50, 0),
            Rgba::new(255, 255, 255, 128),
        ];
        let flat = flatten_rgba(ImgVec::new(buf, 3, 1).as_ref());
        assert_eq!(flat.buf()[0], Rgb::new(200, 100, 50));
        assert_eq!(flat.buf()[1], Rgb::new(0, 0, 0));
        assert_eq!(flat.buf()[2], Rgb::new(128, 128, 128));
    }

    #[test]
    fn premultiply_endpoints() {
        for c in 0..=255u8 {
            assert_eq!(premultiply(c, 255), c);
            assert_eq!(premultiply(c, 0), 0);
        }
    }
}
