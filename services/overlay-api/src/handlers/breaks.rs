//! Class breaks over an extent.

use axum::extract::Extension;
use axum::{Form, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::model::{breaks_or_fail, extent_model};
use crate::params::{parse_bbox, parse_dimension, parse_num_breaks, ModelParams, RawParams};
use crate::state::AppState;

use super::common::ApiResult;

/// `POST /gt/breaks`: quantile class breaks for a weighted overlay over
/// an arbitrary bounding box.
///
/// The working grid defaults to the configured breaks resolution and can
/// be overridden per request with `cols` / `rows`.
pub async fn breaks_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(raw): Form<RawParams>,
) -> ApiResult<Json<Value>> {
    let params = ModelParams::from_raw(&raw)?;
    let bbox = parse_bbox(raw.bbox.as_deref(), params.srid)?;
    let num_breaks = parse_num_breaks(raw.num_breaks.as_deref())?;
    let cols = parse_dimension(raw.cols.as_deref(), "cols", state.breaks_resolution)?;
    let rows = parse_dimension(raw.rows.as_deref(), "rows", state.breaks_resolution)?;

    let raster = extent_model(&state, &params, bbox, cols, rows).await?;
    let breaks = breaks_or_fail(&raster, num_breaks)?;
    info!(breaks = breaks.len(), requested = num_breaks, "computed class breaks");

    Ok(Json(json!({ "classBreaks": breaks })))
}
