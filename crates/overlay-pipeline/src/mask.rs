//! Mask stages: polygon, layer value-allow-list, and threshold.
//!
//! Masks are unary `Raster -> Raster` transforms composed in order
//! polygon → layer → threshold. All three are conjunctive and none
//! transforms surviving values, so the composition order does not affect
//! the result; the fixed order is kept for deterministic logs.

use geo::Polygon;
use std::collections::BTreeMap;
use tracing::warn;

use overlay_common::geom::point_in_any;
use overlay_common::{OverlayResult, Raster, NODATA};

use crate::source::RasterSource;

/// Per-layer value allow-lists: layer name -> values considered "pass".
pub type LayerMask = BTreeMap<String, Vec<i32>>;

/// Parse the `layerMask` request field: a JSON object
/// `{"layerName": [v, ...]}`. Empty input means no mask; malformed input
/// degrades to no mask with a warning.
pub fn parse_layer_mask(input: &str) -> Option<LayerMask> {
    if input.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<LayerMask>(input) {
        Ok(mask) if mask.is_empty() => None,
        Ok(mask) => Some(mask),
        Err(err) => {
            warn!(error = %err, "ignoring unparseable layer mask");
            None
        }
    }
}

/// Keep cells whose centers lie inside the union of the polygons.
///
/// Polygons must already be in the raster's CRS. An empty polygon set is
/// the identity.
pub fn polygon_mask(raster: Raster, polygons: &[Polygon<f64>]) -> Raster {
    if polygons.is_empty() {
        return raster;
    }

    let grid = raster.raster_extent;
    raster.retain(|col, row, _| {
        let (x, y) = grid.grid_to_map(col, row);
        point_in_any(polygons, x, y)
    })
}

/// Keep cells permitted by every layer's allow-list.
///
/// For each `(layer, allowed)` entry the mask layer is fetched through the
/// same source as the model layers; a cell survives iff the mask raster
/// has data there and its value is in the allow-list. Entries compose as
/// logical AND.
pub async fn layer_mask(
    source: &dyn RasterSource,
    mut raster: Raster,
    masks: &LayerMask,
) -> OverlayResult<Raster> {
    for (layer, allowed) in masks {
        let mask_raster = source.read(layer).await?;
        raster = raster.combine(&mask_raster, |v, m| {
            if allowed.contains(&m) {
                v
            } else {
                NODATA
            }
        })?;
    }
    Ok(raster)
}

/// Keep cells with value >= `threshold`. `NODATA` disables the stage.
pub fn threshold_mask(raster: Raster, threshold: i32) -> Raster {
    if threshold == NODATA {
        return raster;
    }
    raster.retain(|_, _, v| v >= threshold)
}

/// Apply the three mask stages in their canonical order.
pub async fn apply_masks(
    source: &dyn RasterSource,
    raster: Raster,
    polygons: &[Polygon<f64>],
    masks: Option<&LayerMask>,
    threshold: i32,
) -> OverlayResult<Raster> {
    let raster = polygon_mask(raster, polygons);
    let raster = match masks {
        Some(masks) => layer_mask(source, raster, masks).await?,
        None => raster,
    };
    Ok(threshold_mask(raster, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use overlay_common::geom::parse_polygons;
    use overlay_common::{Extent, RasterExtent};
    use test_utils::{constant_cells, ramp_cells, split_cells};

    fn re(cols: usize, rows: usize) -> RasterExtent {
        RasterExtent::new(Extent::new(0.0, 0.0, 100.0, 100.0), cols, rows)
    }

    fn quadrant_polygon() -> Vec<Polygon<f64>> {
        // Covers the top-left quadrant of the 0..100 extent.
        parse_polygons(
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
                "geometry":{"type":"Polygon","coordinates":[[[0,50],[50,50],[50,100],[0,100],[0,50]]]}}]}"#,
        )
    }

    #[test]
    fn test_polygon_mask_empty_is_identity() {
        let r = Raster::new(re(4, 4), ramp_cells(4, 4)).unwrap();
        let masked = polygon_mask(r.clone(), &[]);
        assert_eq!(masked, r);
    }

    #[test]
    fn test_polygon_mask_keeps_quadrant() {
        let r = Raster::new(re(4, 4), ramp_cells(4, 4)).unwrap();
        let masked = polygon_mask(r, &quadrant_polygon());

        // Top-left 2x2 cells have centers inside the polygon.
        assert_eq!(masked.get(0, 0), 0);
        assert_eq!(masked.get(1, 1), 5);
        assert_eq!(masked.get(2, 0), NODATA);
        assert_eq!(masked.get(0, 2), NODATA);
        assert_eq!(masked.data_count(), 4);
    }

    #[test]
    fn test_polygon_mask_preserves_extent() {
        let r = Raster::new(re(4, 4), ramp_cells(4, 4)).unwrap();
        let grid = r.raster_extent;
        let masked = polygon_mask(r, &quadrant_polygon());
        assert_eq!(masked.raster_extent, grid);
    }

    #[tokio::test]
    async fn test_layer_mask_allows_listed_values() {
        let model = Raster::new(re(4, 4), constant_cells(4, 4, 10)).unwrap();
        let mask = Raster::new(re(4, 4), split_cells(4, 4, 10, 20)).unwrap();
        let source = MemorySource::new().with("m", mask);

        let masks = LayerMask::from([("m".to_string(), vec![10])]);
        let out = layer_mask(&source, model, &masks).await.unwrap();

        // Left half passes, right half is masked out.
        assert_eq!(out.get(0, 0), 10);
        assert_eq!(out.get(1, 3), 10);
        assert_eq!(out.get(2, 0), NODATA);
        assert_eq!(out.get(3, 3), NODATA);
    }

    #[tokio::test]
    async fn test_layer_mask_nodata_mask_cell_blocks() {
        let model = Raster::new(re(2, 2), constant_cells(2, 2, 1)).unwrap();
        let mut mask_cells = constant_cells(2, 2, 5);
        mask_cells[0] = NODATA;
        let mask = Raster::new(re(2, 2), mask_cells).unwrap();
        let source = MemorySource::new().with("m", mask);

        let masks = LayerMask::from([("m".to_string(), vec![5])]);
        let out = layer_mask(&source, model, &masks).await.unwrap();
        assert_eq!(out.cells, vec![NODATA, 1, 1, 1]);
    }

    #[test]
    fn test_threshold_mask() {
        let r = Raster::new(re(4, 4), ramp_cells(4, 4)).unwrap();

        // Disabled threshold is the identity.
        let out = threshold_mask(r.clone(), NODATA);
        assert_eq!(out, r);

        // Threshold at or below the minimum changes nothing.
        let out = threshold_mask(r.clone(), 0);
        assert_eq!(out, r);

        // Threshold above the maximum wipes the raster.
        let out = threshold_mask(r.clone(), 16);
        assert_eq!(out.data_count(), 0);

        // Interior threshold keeps the upper tail.
        let out = threshold_mask(r, 12);
        assert_eq!(out.data_count(), 4);
    }

    #[test]
    fn test_parse_layer_mask() {
        assert_eq!(parse_layer_mask(""), None);
        assert_eq!(parse_layer_mask("{}"), None);
        assert_eq!(parse_layer_mask("{nope"), None);

        let mask = parse_layer_mask(r#"{"landuse": [21, 22]}"#).unwrap();
        assert_eq!(mask["landuse"], vec![21, 22]);
    }

    #[tokio::test]
    async fn test_mask_stages_commute_on_survival() {
        let model = Raster::new(re(4, 4), ramp_cells(4, 4)).unwrap();
        let mask = Raster::new(re(4, 4), split_cells(4, 4, 1, 2)).unwrap();
        let source = MemorySource::new().with("m", mask);
        let polygons = quadrant_polygon();
        let masks = LayerMask::from([("m".to_string(), vec![1])]);
        let threshold = 4;

        // Canonical order.
        let a = {
            let r = polygon_mask(model.clone(), &polygons);
            let r = layer_mask(&source, r, &masks).await.unwrap();
            threshold_mask(r, threshold)
        };

        // Threshold first, then layer, then polygon.
        let b = {
            let r = threshold_mask(model.clone(), threshold);
            let r = layer_mask(&source, r, &masks).await.unwrap();
            polygon_mask(r, &polygons)
        };

        // Layer first, then polygon, then threshold.
        let c = {
            let r = layer_mask(&source, model.clone(), &masks).await.unwrap();
            let r = polygon_mask(r, &polygons);
            threshold_mask(r, threshold)
        };

        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}
