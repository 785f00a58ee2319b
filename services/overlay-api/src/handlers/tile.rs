//! Single web-map tile rendering.

use axum::extract::{Extension, Path};
use axum::response::Response;
use axum::Form;
use std::sync::Arc;

use overlay_common::{OverlayError, TileKey};
use overlay_renderer::render::render_png_with_colors;

use crate::model::{breaks_or_fail, tile_model};
use crate::params::{parse_breaks, parse_num_breaks, parse_palette, ModelParams, RawParams};
use crate::state::AppState;

use super::common::{png_response, render_colors, ApiResult};

/// `POST /gt/tile/{z}/{x}/{y}.png`: render exactly one Web Mercator tile
/// of the masked weighted overlay.
pub async fn tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((z, x, y)): Path<(u32, u32, String)>,
    Form(raw): Form<RawParams>,
) -> ApiResult<Response> {
    // The final path segment carries the ".png" suffix.
    let y: u32 = y
        .strip_suffix(".png")
        .unwrap_or(&y)
        .parse()
        .map_err(|_| OverlayError::invalid("y", format!("'{}' is not a tile row", y)))?;

    let params = ModelParams::from_raw(&raw)?;
    let raster = tile_model(&state, &params, z, TileKey::new(x, y)).await?;

    let breaks = match parse_breaks(raw.breaks.as_deref())? {
        Some(breaks) => breaks,
        None => breaks_or_fail(&raster, parse_num_breaks(raw.num_breaks.as_deref())?)?,
    };
    let colors = render_colors(
        parse_palette(raw.palette.as_deref())?,
        raw.color_ramp.as_deref(),
        breaks.len(),
    );

    let png = render_png_with_colors(&raster, &breaks, &colors)?;
    Ok(png_response(png))
}
