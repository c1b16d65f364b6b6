//! Palette quantization for GIF output.

use std::collections::HashSet;

use crate::pixel::{ImgRef, Rgba};

/// Produces a palette of at most `max_colors` entries for an image.
///
/// Implementations are shared between threads through
/// [`EncodeConfig`](crate::config::EncodeConfig), so they must be `Send + Sync`.
pub trait Quantizer: Send + Sync {
    /// Build the palette. Returning more than `max_colors` entries is an error
    /// surfaced by the GIF encoder; returning none is an error too.
    fn quantize(&self, img: ImgRef<'_, Rgba<u8>>, max_colors: usize) -> Vec<Rgba<u8>>;

    /// Short name used in logs and `Debug` output.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Every distinct color of `img`, in order of first appearance.
///
/// `None` once more than `max_colors` distinct colors are found.
pub fn exact_palette(img: ImgRef<'_, Rgba<u8>>, max_colors: usize) -> Option<Vec<Rgba<u8>>> {
    let mut seen = HashSet::new();
    let mut palette = Vec::new();
    for px in img.pixels() {
        if seen.insert(px) {
            if palette.len() == max_colors {
                return None;
            }
            palette.push(px);
        }
    }
    Some(palette)
}

/// NeuQuant neural-network quantizer.
#[cfg(feature = "gif")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeuQuantizer {
    /// Learning sample factor, 1 (best) to 30 (fastest).
    pub sample_factor: i32,
}

#[cfg(feature = "gif")]
impl Default for NeuQuantizer {
    fn default() -> Self {
        Self { sample_factor: 10 }
    }
}

#[cfg(feature = "gif")]
impl NeuQuantizer {
    /// Quantizer with the given sample factor, clamped to 1..=30.
    pub fn new(sample_factor: i32) -> Self {
        Self {
            sample_factor: sample_factor.clamp(1, 30),
        }
    }

    pub(crate) fn train(&self, img: ImgRef<'_, Rgba<u8>>, max_colors: usize) -> color_quant::NeuQuant {
        let bytes = crate::pixel::to_bytes(img);
        color_quant::NeuQuant::new(self.sample_factor.clamp(1, 30), max_colors.max(1), &bytes)
    }
}

#[cfg(feature = "gif")]
impl Quantizer for NeuQuantizer {
    fn quantize(&self, img: ImgRef<'_, Rgba<u8>>, max_colors: usize) -> Vec<Rgba<u8>> {
        let nq = self.train(img, max_colors);
        nq.color_map_rgba()
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect()
    }

    fn name(&self) -> &'static str {
        "neuquant"
    }
}

/// Exact palette when it fits, NeuQuant otherwise.
#[cfg(feature = "gif")]
pub(crate) fn default_palette(img: ImgRef<'_, Rgba<u8>>, max_colors: usize) -> Vec<Rgba<u8>> {
    match exact_palette(img, max_colors) {
        Some(palette) => {
            tracing::trace!(colors = palette.len(), "exact palette");
            palette
        }
        None => NeuQuantizer::default().quantize(img, max_colors),
    }
}
