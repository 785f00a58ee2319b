//! Point sampling against a catalog layer.
//!
//! Two variants with an identical contract: sample the layer's native
//! zoom at each point, returning `(id, x, y, value)` in input order with
//! coordinates in EPSG:3857. The batched variant groups points by their
//! containing tile and reads each unique tile at most once.

use futures::future::try_join_all;
use std::collections::HashMap;
use tracing::warn;

use overlay_catalog::Catalog;
use overlay_common::crs::reproject_point;
use overlay_common::{OverlayError, OverlayResult, Srid, TileKey, NODATA};

/// A point to sample, already reprojected to EPSG:3857.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// A sampled value at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledValue {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub value: i32,
}

/// Parse the `coords` request field: `id,x,y,id,x,y,...`.
///
/// Coordinates are reprojected from `srid` into EPSG:3857. Triples whose
/// coordinates fail numeric parsing are skipped with a warning; a
/// trailing partial triple is ignored.
pub fn parse_coords(coords: &str, srid: Srid) -> Vec<SamplePoint> {
    let fields: Vec<&str> = coords.split(',').map(str::trim).collect();

    fields
        .chunks_exact(3)
        .filter_map(|triple| {
            let (id, raw_x, raw_y) = (triple[0], triple[1], triple[2]);
            match (raw_x.parse::<f64>(), raw_y.parse::<f64>()) {
                (Ok(x), Ok(y)) => {
                    let (x, y) = reproject_point(x, y, srid);
                    Some(SamplePoint {
                        id: id.to_string(),
                        x,
                        y,
                    })
                }
                _ => {
                    warn!(id, x = raw_x, y = raw_y, "skipping unparseable coordinate triple");
                    None
                }
            }
        })
        .collect()
}

/// Sample each point by reading its containing tile, one read per point.
pub async fn sample_points(
    catalog: &Catalog,
    layer: &str,
    points: &[SamplePoint],
) -> OverlayResult<Vec<SampledValue>> {
    let zoom = native_zoom(catalog, layer)?;
    let reader = catalog.tile_reader(layer, zoom)?;
    let layout = *reader.layout();

    let mut values = Vec::with_capacity(points.len());
    for point in points {
        let value = match layout.tile_for(point.x, point.y) {
            Some(key) => reader.read(key).await?.value_at(point.x, point.y),
            None => NODATA,
        };
        values.push(SampledValue {
            id: point.id.clone(),
            x: point.x,
            y: point.y,
            value,
        });
    }
    Ok(values)
}

/// Sample points through the tile reader, reading each unique tile once.
///
/// Points are grouped by their containing `TileKey`; the distinct tiles
/// are read concurrently and every point samples from the in-memory tile.
/// Output order matches input order.
pub async fn sample_points_batched(
    catalog: &Catalog,
    layer: &str,
    points: &[SamplePoint],
) -> OverlayResult<Vec<SampledValue>> {
    let zoom = native_zoom(catalog, layer)?;
    let reader = catalog.tile_reader(layer, zoom)?;
    let layout = *reader.layout();

    let mut groups: HashMap<TileKey, Vec<usize>> = HashMap::new();
    for (index, point) in points.iter().enumerate() {
        if let Some(key) = layout.tile_for(point.x, point.y) {
            groups.entry(key).or_default().push(index);
        }
    }

    let keys: Vec<TileKey> = groups.keys().copied().collect();
    let tiles = try_join_all(keys.iter().map(|&key| reader.read(key))).await?;

    let mut values: Vec<i32> = vec![NODATA; points.len()];
    for (key, tile) in keys.into_iter().zip(tiles) {
        for &index in &groups[&key] {
            let point = &points[index];
            values[index] = tile.value_at(point.x, point.y);
        }
    }

    Ok(points
        .iter()
        .zip(values)
        .map(|(point, value)| SampledValue {
            id: point.id.clone(),
            x: point.x,
            y: point.y,
            value,
        })
        .collect())
}

fn native_zoom(catalog: &Catalog, layer: &str) -> OverlayResult<u32> {
    catalog
        .metadata(layer)?
        .max_zoom()
        .ok_or_else(|| OverlayError::LayerNotFound(format!("{} (no zoom levels)", layer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::crs::wgs84_to_mercator;
    use test_utils::assert_coords_approx_eq;

    #[test]
    fn test_parse_coords_in_mercator() {
        let points = parse_coords("a,100.0,200.0,b,-5.5,7.25", Srid::Epsg3857);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "a");
        assert_eq!(points[0].x, 100.0);
        assert_eq!(points[1].y, 7.25);
    }

    #[test]
    fn test_parse_coords_reprojects_from_wgs84() {
        let points = parse_coords("pt,174.78,-41.29", Srid::Epsg4326);
        let (x, y) = wgs84_to_mercator(174.78, -41.29);
        assert_coords_approx_eq!((points[0].x, points[0].y), (x, y), 1e-6);
    }

    #[test]
    fn test_parse_coords_skips_bad_triples() {
        let points = parse_coords("a,1,2,b,oops,4,c,5,6", Srid::Epsg3857);
        let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_parse_coords_ignores_trailing_partial() {
        let points = parse_coords("a,1,2,b,3", Srid::Epsg3857);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_parse_coords_empty() {
        assert!(parse_coords("", Srid::Epsg3857).is_empty());
    }
}
