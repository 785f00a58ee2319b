//! Model orchestration: overlay plus masks for both execution modes.

use tracing::instrument;

use overlay_common::{Extent, OverlayError, OverlayResult, Raster, RasterExtent, TileKey, NODATA};
use overlay_pipeline::{apply_masks, class_breaks, weighted_overlay, ExtentSource, TileSource};

use crate::params::ModelParams;
use crate::state::AppState;

/// Run the weighted overlay plus mask stages over an arbitrary window.
#[instrument(skip_all, fields(layers = params.layers.len(), cols = cols, rows = rows))]
pub async fn extent_model(
    state: &AppState,
    params: &ModelParams,
    bbox: Extent,
    cols: usize,
    rows: usize,
) -> OverlayResult<Raster> {
    let target = RasterExtent::new(bbox, cols, rows);
    let source = ExtentSource::new(&state.catalog, target);

    let fused = weighted_overlay(&source, &params.layers, &params.weights).await?;
    apply_masks(
        &source,
        fused,
        &params.polygons,
        params.layer_mask.as_ref(),
        params.threshold,
    )
    .await
}

/// Run the weighted overlay plus mask stages for one web-map tile.
#[instrument(skip_all, fields(layers = params.layers.len(), zoom = zoom, x = key.x, y = key.y))]
pub async fn tile_model(
    state: &AppState,
    params: &ModelParams,
    zoom: u32,
    key: TileKey,
) -> OverlayResult<Raster> {
    let source = TileSource::new(&state.catalog, zoom, key);

    let fused = weighted_overlay(&source, &params.layers, &params.weights).await?;
    apply_masks(
        &source,
        fused,
        &params.polygons,
        params.layer_mask.as_ref(),
        params.threshold,
    )
    .await
}

/// Class breaks over a model raster, reporting the all-NoData case as a
/// domain failure.
pub fn breaks_or_fail(raster: &Raster, num_breaks: usize) -> OverlayResult<Vec<i32>> {
    let breaks = class_breaks(raster, num_breaks);
    if breaks == [NODATA] {
        return Err(OverlayError::UnableToCompute(
            "Unable to calculate breaks (NODATA)".to_string(),
        ));
    }
    Ok(breaks)
}
