//! Weighted overlay rendered as a PNG over an extent.

use axum::extract::Extension;
use axum::response::Response;
use axum::Form;
use std::sync::Arc;

use overlay_renderer::render::render_png_with_colors;

use crate::model::{breaks_or_fail, extent_model};
use crate::params::{
    parse_bbox, parse_breaks, parse_dimension, parse_num_breaks, parse_palette, ModelParams,
    RawParams,
};
use crate::state::AppState;

use super::common::{png_response, render_colors, ApiResult};

/// `POST /gt/wo`: render the masked weighted overlay as a color-ramped
/// PNG over the request bbox.
///
/// Break values come from the `breaks` field when supplied (the client
/// usually forwards the `/gt/breaks` result); otherwise they are computed
/// from the rendered raster with `numBreaks`.
pub async fn weighted_overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(raw): Form<RawParams>,
) -> ApiResult<Response> {
    let params = ModelParams::from_raw(&raw)?;
    let bbox = parse_bbox(raw.bbox.as_deref(), params.srid)?;
    let cols = parse_dimension(raw.cols.as_deref(), "cols", state.breaks_resolution)?;
    let rows = parse_dimension(raw.rows.as_deref(), "rows", state.breaks_resolution)?;

    let raster = extent_model(&state, &params, bbox, cols, rows).await?;

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
