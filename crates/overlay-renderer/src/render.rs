//! Break-bucket colorization of a raster into a PNG.

use rayon::prelude::*;

use overlay_common::{is_data, OverlayError, OverlayResult, Raster};

use crate::png::{self, MAX_PALETTE_SIZE};
use crate::ramp::{ramp_or_default, Color};

/// Index of the color bucket for a value: the smallest break `>= v`
/// (upper-inclusive buckets). Values above the last break take the last
/// bucket.
#[inline]
fn bucket_index(value: i32, breaks: &[i32]) -> usize {
    breaks
        .partition_point(|&b| b < value)
        .min(breaks.len() - 1)
}

/// Render a raster as an 8-bit RGBA PNG.
///
/// The named ramp (falling back to the default for unknown names) is
/// interpolated to one color per break; NoData cells render transparent.
pub fn render_png(raster: &Raster, breaks: &[i32], ramp_name: &str) -> OverlayResult<Vec<u8>> {
    let colors = ramp_or_default(ramp_name).interpolate(breaks.len());
    render_png_with_colors(raster, breaks, &colors)
}

/// Render with an explicit color list, one color per break.
pub fn render_png_with_colors(
    raster: &Raster,
    breaks: &[i32],
    colors: &[Color],
) -> OverlayResult<Vec<u8>> {
    if breaks.is_empty() || colors.len() != breaks.len() {
        return Err(OverlayError::RenderError(format!(
            "{} colors for {} breaks",
            colors.len(),
            breaks.len()
        )));
    }

    let (width, height) = (raster.cols(), raster.rows());

    // Palette: one entry per break plus the transparent NoData entry.
    if colors.len() + 1 <= MAX_PALETTE_SIZE {
        let mut palette = colors.to_vec();
        palette.push(Color::transparent());
        let transparent = (palette.len() - 1) as u8;

        let mut indices = vec![0u8; raster.cells.len()];
        indices
            .par_chunks_mut(width)
            .zip(raster.cells.par_chunks(width))
            .for_each(|(out_row, cells)| {
                for (out, &v) in out_row.iter_mut().zip(cells) {
                    *out = if is_data(v) {
                        bucket_index(v, breaks) as u8
                    } else {
                        transparent
                    };
                }
            });

        return png::create_png_indexed(width, height, &palette, &indices)
            .map_err(OverlayError::RenderError);
    }

    // Palette too large for an indexed encoding: expand to RGBA.
    let mut pixels = vec![0u8; raster.cells.len() * 4];
    pixels
        .par_chunks_mut(width * 4)
        .zip(raster.cells.par_chunks(width))
        .for_each(|(out_row, cells)| {
            for (out, &v) in out_row.chunks_exact_mut(4).zip(cells) {
                let color = if is_data(v) {
                    colors[bucket_index(v, breaks)]
                } else {
                    Color::transparent()
                };
                out[0] = color.r;
                out[1] = color.g;
                out[2] = color.b;
                out[3] = color.a;
            }
        });

    png::create_png(&pixels, width, height).map_err(OverlayError::RenderError)
}
