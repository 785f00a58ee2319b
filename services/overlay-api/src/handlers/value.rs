//! Point sampling endpoints.
//!
//! Both variants share one contract and one response shape:
//! `{"coords": [[id, x, y, value], ...]}` with coordinates in EPSG:3857
//! and `null` for points outside layer coverage.

use axum::extract::Extension;
use axum::{Form, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use overlay_common::is_data;
use overlay_pipeline::{parse_coords, sample_points, sample_points_batched, SampledValue};

use crate::params::{parse_single_layer, parse_srid, RawParams};
use crate::state::AppState;

use super::common::ApiResult;

/// `POST /gt/value`: sample the layer at each point, one tile read per
/// point.
pub async fn value_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(raw): Form<RawParams>,
) -> ApiResult<Json<Value>> {
    let (layer, points) = parse_request(&raw)?;
    let sampled = sample_points(&state.catalog, &layer, &points).await?;
    Ok(Json(coords_response(&sampled)))
}

/// `POST /gt/spark/value`: sample through the tile reader, reading each
/// distinct tile at most once.
pub async fn spark_value_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(raw): Form<RawParams>,
) -> ApiResult<Json<Value>> {
    let (layer, points) = parse_request(&raw)?;
    let sampled = sample_points_batched(&state.catalog, &layer, &points).await?;
    Ok(Json(coords_response(&sampled)))
}

fn parse_request(
    raw: &RawParams,
) -> Result<(String, Vec<overlay_pipeline::SamplePoint>), super::common::ApiError> {
    let srid = parse_srid(raw.srid.as_deref())?;
    let layer = parse_single_layer(raw)?;
    let points = parse_coords(raw.coords.as_deref().unwrap_or_default(), srid);
    Ok((layer, points))
}

/// Serialize sampled values in input order; NoData samples carry `null`.
pub fn coords_response(values: &[SampledValue]) -> Value {
    let coords: Vec<Value> = values
        .iter()
        .map(|v| {
            let value = if is_data(v.value) {
                json!(v.value)
            } else {
                Value::Null
            };
            json!([v.id, v.x, v.y, value])
        })
        .collect();
    json!({ "coords": coords })
}
