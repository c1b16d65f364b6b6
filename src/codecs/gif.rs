//! GIF codec adapter: `gif` crate for encoding, `image` for decoding.
//!
//! Encoding quantizes to a palette of at most 256 colors and maps pixels onto
//! it either with Floyd-Steinberg error diffusion or plain nearest-color lookup.

use std::collections::HashMap;
use std::io::Write;

use image::imageops::ColorMap;

use crate::config::GifDrawer;
use crate::pixel::{ImgVec, PixelData, Rgba, map_pixels};
use crate::quantize::{self, Quantizer};
use crate::{CodecError, DecodeOutput, ImageFormat, Limits};

/// Decode the first GIF frame, composited onto the logical screen.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<DecodeOutput, CodecError> {
    let mut output = super::decode_with_image(data, ImageFormat::Gif, limits)?;
    output.info.frame_count = count_frames(data);
    Ok(output)
}

/// Count frames without decompressing them. `None` if the stream can't be walked.
fn count_frames(data: &[u8]) -> Option<u32> {
    let mut options = gif::DecodeOptions::new();
    options.skip_frame_decoding(true);
    let mut decoder = options.read_info(data).ok()?;
    let mut count = 0u32;
    loop {
        match decoder.read_next_frame() {
            Ok(Some(_)) => count += 1,
            Ok(None) => return Some(count),
            Err(e) => {
                tracing::trace!(error = %e, frames = count, "stopped counting GIF frames");
                return None;
            }
        }
    }
}

/// Palette lookup for `image::imageops` dithering and indexing.
struct PaletteMap {
    colors: Vec<Rgba<u8>>,
    exact: HashMap<Rgba<u8>, u8>,
}

impl PaletteMap {
    fn new(colors: Vec<Rgba<u8>>) -> Self {
        let mut exact = HashMap::with_capacity(colors.len());
        for (i, &c) in colors.iter().enumerate() {
            exact.entry(c).or_insert(i as u8);
        }
        Self { colors, exact }
    }

    fn nearest(&self, c: Rgba<u8>) -> usize {
        let dist = |p: &Rgba<u8>| {
            let d = |a: u8, b: u8| {
                let d = i32::from(a) - i32::from(b);
                d * d
            };
            d(p.r, c.r) + d(p.g, c.g) + d(p.b, c.b) + d(p.a, c.a)
        };
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| dist(p))
            .map_or(0, |(i, _)| i)
    }
}

impl ColorMap for PaletteMap {
    type Color = image::Rgba<u8>;

    fn index_of(&self, color: &Self::Color) -> usize {
        let [r, g, b, a] = color.0;
        let c = Rgba::new(r, g, b, a);
        match self.exact.get(&c) {
            Some(&i) => usize::from(i),
            None => self.nearest(c),
        }
    }

    fn lookup(&self, index: usize) -> Option<Self::Color> {
        self.colors.get(index).map(|c| image::Rgba([c.r, c.g, c.b, c.a]))
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Self::Color) {
        if let Some(mapped) = self.lookup(self.index_of(color)) {
            *color = mapped;
        }
    }
}

/// Run the configured quantizer, or the default one, and check its output size.
fn build_palette(
    img: ImgVec<Rgba<u8>>,
    max_colors: usize,
    quantizer: Option<&dyn Quantizer>,
) -> Result<Vec<Rgba<u8>>, CodecError> {
    let palette = match quantizer {
        Some(q) => {
            tracing::trace!(quantizer = q.name(), max_colors, "quantizing");
            q.quantize(img.as_ref(), max_colors)
        }
        None => quantize::default_palette(img.as_ref(), max_colors),
    };
    if palette.is_empty() || palette.len() > max_colors {
        return Err(CodecError::from_encoder(
            ImageFormat::Gif,
            format!(
                "quantizer produced {} colors, expected 1..={max_colors}",
                palette.len()
            ),
        ));
    }
    Ok(palette)
}

/// Encode a single-frame GIF.
pub(crate) fn encode(
    image: &PixelData,
    num_colors: usize,
    quantizer: Option<&dyn Quantizer>,
    drawer: GifDrawer,
    sink: &mut dyn Write,
) -> Result<(), CodecError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CodecError::InvalidInput(format!(
            "cannot encode an empty {}x{} image",
            image.width(),
            image.height()
        )));
    }
    let width = u16::try_from(image.width())
        .map_err(|_| CodecError::InvalidInput("width exceeds GIF maximum (65535)".into()))?;
    let height = u16::try_from(image.height())
        .map_err(|_| CodecError::InvalidInput("height exceeds GIF maximum (65535)".into()))?;

    let mut rgba = image.to_rgba8();
    let max_colors = num_colors.min(256);
    let transparent: Vec<bool> = rgba.pixels().map(|p| p.a == 0).collect();
    // One index is kept back for fully transparent pixels when there is room for it.
    let reserve = max_colors >= 2 && transparent.contains(&true);

    let palette = if reserve {
        let visible: Vec<Rgba<u8>> = rgba.pixels().filter(|p| p.a != 0).collect();
        if visible.is_empty() {
            Vec::new()
        } else {
            let count = visible.len();
            build_palette(ImgVec::new(visible, count, 1), max_colors - 1, quantizer)?
        }
    } else {
        let all = map_pixels(rgba.as_ref(), |p| if p.a == 0 { Rgba::new(0, 0, 0, 0) } else { p });
        build_palette(all, max_colors, quantizer)?
    };

    if reserve && let Some(&fill) = palette.first() {
        // Stand-in colour from the palette, so these pixels add no diffusion error.
        for (px, &clear) in rgba.buf_mut().iter_mut().zip(&transparent) {
            if clear {
                *px = fill;
            }
        }
    }
    let map = PaletteMap::new(palette);

    let mut buffer = image::RgbaImage::from_raw(
        u32::from(width),
        u32::from(height),
        crate::pixel::to_bytes(rgba.as_ref()),
    )
    .ok_or_else(|| CodecError::InvalidInput("pixel buffer does not match dimensions".into()))?;

    // Error diffusion needs at least a 2x2 neighbourhood.
    if drawer == GifDrawer::FloydSteinberg && width >= 2 && height >= 2 && !map.colors.is_empty() {
        image::imageops::dither(&mut buffer, &map);
    }
    let mut indices = image::imageops::index_colors(&buffer, &map).into_raw();

    let mut colors = map.colors;
    let transparent_index = if reserve {
        let index = colors.len() as u8;
        colors.push(Rgba::new(0, 0, 0, 0));
        for (i, &clear) in indices.iter_mut().zip(&transparent) {
            if clear {
                *i = index;
            }
        }
        Some(index)
    } else {
        colors.iter().position(|c| c.a == 0).map(|i| i as u8)
    };
    let rgb_palette: Vec<u8> = colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect();

    let frame = gif::Frame::from_palette_pixels(
        width,
        height,
        indices,
        rgb_palette,
        transparent_index,
    );

    let mut encoder = gif::Encoder::new(sink, width, height, &[])
        .map_err(|e| CodecError::from_encoder(ImageFormat::Gif, e))?;
    encoder
        .write_frame(&frame)
        .map_err(|e| CodecError::from_encoder(ImageFormat::Gif, e))?;
    encoder
        .into_inner()
        .map_err(|e| CodecError::from_encoder(ImageFormat::Gif, e))?;
    Ok(())
}
