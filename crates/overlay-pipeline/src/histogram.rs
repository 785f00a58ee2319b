//! Value histograms, plain and zonal.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::Polygon;
use rayon::prelude::*;
use std::collections::BTreeMap;

use overlay_common::geom::point_in_any;
use overlay_common::{is_data, Extent, Raster};

/// Count of each non-NoData value over the whole raster.
pub fn value_histogram(raster: &Raster) -> BTreeMap<i32, u64> {
    let mut counts = BTreeMap::new();
    for &v in &raster.cells {
        if is_data(v) {
            *counts.entry(v).or_insert(0) += 1;
        }
    }
    counts
}

/// Zonal histogram: count cells whose centers lie inside the polygons.
///
/// An empty polygon set degenerates to the plain histogram. Each polygon
/// is counted independently and the per-polygon results are merged by
/// summation, so overlapping zones count shared cells once per zone. The
/// per-polygon scans run in parallel; the merge is commutative.
pub fn zonal_histogram(raster: &Raster, polygons: &[Polygon<f64>]) -> BTreeMap<i32, u64> {
    if polygons.is_empty() {
        return value_histogram(raster);
    }

    polygons
        .par_iter()
        .map(|polygon| polygon_counts(raster, polygon))
        .reduce(BTreeMap::new, merge_counts)
}

fn polygon_counts(raster: &Raster, polygon: &Polygon<f64>) -> BTreeMap<i32, u64> {
    let grid = raster.raster_extent;
    let mut counts = BTreeMap::new();

    // Restrict the scan to cells overlapping the polygon's envelope.
    let Some(rect) = polygon.bounding_rect() else {
        return counts;
    };
    let envelope = Extent::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
    if !grid.extent.intersects(&envelope) {
        return counts;
    }

    let zone = std::slice::from_ref(polygon);
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (x, y) = grid.grid_to_map(col, row);
            if !envelope.contains_point(x, y) {
                continue;
            }
            let v = raster.get(col, row);
            if is_data(v) && point_in_any(zone, x, y) {
                *counts.entry(v).or_insert(0) += 1;
            }
        }
    }
    counts
}

fn merge_counts(mut a: BTreeMap<i32, u64>, b: BTreeMap<i32, u64>) -> BTreeMap<i32, u64> {
    for (value, count) in b {
        *a.entry(value).or_insert(0) += count;
    }
    a
}
