//! Weighted overlay: the pixelwise weighted sum of the input layers.

use futures::future::try_join_all;
use tracing::debug;

use overlay_common::{OverlayError, OverlayResult, Raster};

use crate::source::RasterSource;

/// Multiply each layer by its integer weight and sum pixelwise.
///
/// Zero-weight layers are skipped before any I/O: a disabled layer must
/// not constrain coverage, and the common UI pattern is many layers with
/// few enabled. NoData is absorbing: a cell of the result is data only
/// when every contributing layer had data there.
pub async fn weighted_overlay(
    source: &dyn RasterSource,
    layers: &[String],
    weights: &[i32],
) -> OverlayResult<Raster> {
    if layers.is_empty() {
        return Err(OverlayError::MissingParameter("layers".to_string()));
    }
    if layers.len() != weights.len() {
        return Err(OverlayError::invalid(
            "weights",
            format!(
                "expected {} weights for {} layers, got {}",
                layers.len(),
                layers.len(),
                weights.len()
            ),
        ));
    }

    let active: Vec<(&str, i32)> = layers
        .iter()
        .map(String::as_str)
        .zip(weights.iter().copied())
        .filter(|&(_, w)| w != 0)
        .collect();

    if active.is_empty() {
        return Err(OverlayError::invalid(
            "weights",
            "at least one weight must be non-zero",
        ));
    }
    debug!(active = active.len(), total = layers.len(), "composing overlay");

    let weighted = try_join_all(active.iter().map(|&(layer, weight)| async move {
        source.read(layer).await.map(|r| scale(r, weight))
    }))
    .await?;

    let mut rasters = weighted.into_iter();
    let Some(first) = rasters.next() else {
        return Err(OverlayError::invalid("weights", "no layers to compose"));
    };
    rasters.try_fold(first, |acc, r| acc.combine(&r, |a, b| a + b))
}

/// Promote cells to 8-bit range (saturating) and apply the weight.
fn scale(raster: Raster, weight: i32) -> Raster {
    raster.map_data(move |v| v.clamp(i8::MIN as i32, i8::MAX as i32) * weight)
}
