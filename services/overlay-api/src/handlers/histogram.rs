//! Zonal histogram of a single layer.

use axum::extract::Extension;
use axum::{Form, Json};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::Polygon;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use overlay_common::geom::{parse_polygons, reproject_polygons};
use overlay_common::{Extent, OverlayError, RasterExtent};
use overlay_pipeline::zonal_histogram;

use crate::params::{parse_dimension, parse_single_layer, parse_srid, RawParams};
use crate::state::AppState;

use super::common::ApiResult;

/// `POST /gt/histogram`: histogram of one layer's values, restricted to
/// the supplied polygons when present.
pub async fn histogram_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(raw): Form<RawParams>,
) -> ApiResult<Json<Value>> {
    let start = Instant::now();

    let srid = parse_srid(raw.srid.as_deref())?;
    let layer = parse_single_layer(&raw)?;
    let polygons = reproject_polygons(
        parse_polygons(raw.poly_mask.as_deref().unwrap_or_default()),
        srid,
    );

    let metadata = state.catalog.metadata(&layer)?;
    let native = metadata
        .max_zoom()
        .ok_or_else(|| OverlayError::LayerNotFound(format!("{} (no zoom levels)", layer)))?;
    let layer_extent = metadata
        .layout(native)
        .map(|layout| layout.extent)
        .ok_or_else(|| OverlayError::LayerNotFound(format!("{} (zoom {})", layer, native)))?;

    let extent = window_extent(&polygons, layer_extent);
    let cols = parse_dimension(raw.cols.as_deref(), "cols", state.breaks_resolution)?;
    let rows = parse_dimension(raw.rows.as_deref(), "rows", state.breaks_resolution)?;

    let raster = state
        .catalog
        .read_window(&layer, RasterExtent::new(extent, cols, rows))
        .await?;
    let histogram = zonal_histogram(&raster, &polygons);

    let elapsed = start.elapsed().as_millis();
    info!(layer = %layer, zones = polygons.len(), values = histogram.len(), elapsed_ms = elapsed, "histogram");

    Ok(Json(json!({
        "elapsed": format!("{}ms", elapsed),
        "histogram": histogram,
    })))
}

/// The window to read: the polygons' combined envelope clipped to the
/// layer, or the layer's full extent when no polygons were supplied.
fn window_extent(polygons: &[Polygon<f64>], layer_extent: Extent) -> Extent {
    let envelope = polygons
        .iter()
        .filter_map(|p| p.bounding_rect())
        .map(|r| Extent::new(r.min().x, r.min().y, r.max().x, r.max().y))
        .reduce(|a, b| a.combine(&b));

    match envelope {
        Some(envelope) => envelope.intersection(&layer_extent).unwrap_or(envelope),
        None => layer_extent,
    }
}
