//! Polygon mask geometry: GeoJSON parsing and reprojection.
//!
//! Parse faults degrade to an empty polygon set rather than failing the
//! request; the fault is logged and the pipeline proceeds unmasked.

use geo::algorithm::map_coords::MapCoords;
use geo::{Contains, Coord, Point, Polygon};
use geojson::GeoJson;
use tracing::warn;

use crate::crs::{reproject_point, Srid};

/// Extract all polygons from a GeoJSON document.
///
/// Accepts a FeatureCollection (also a bare Feature or Geometry) and
/// returns polygons and the member polygons of multipolygons, concatenated
/// in document order. Empty input yields an empty set; malformed input is
/// logged and yields an empty set.
pub fn parse_polygons(input: &str) -> Vec<Polygon<f64>> {
    if input.trim().is_empty() {
        return Vec::new();
    }

    let geojson: GeoJson = match input.parse() {
        Ok(g) => g,
        Err(err) => {
            warn!(error = %err, "ignoring unparseable polygon mask");
            return Vec::new();
        }
    };

    let mut polygons = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geometry) = feature.geometry {
                    collect_polygons(geometry.value, &mut polygons);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                collect_polygons(geometry.value, &mut polygons);
            }
        }
        GeoJson::Geometry(geometry) => collect_polygons(geometry.value, &mut polygons),
    }
    polygons
}

fn collect_polygons(value: geojson::Value, out: &mut Vec<Polygon<f64>>) {
    match geo_types::Geometry::<f64>::try_from(value) {
        Ok(geo_types::Geometry::Polygon(p)) => out.push(p),
        Ok(geo_types::Geometry::MultiPolygon(mp)) => out.extend(mp.0),
        Ok(_) => {} // non-areal geometry cannot mask cells
        Err(err) => {
            warn!(error = %err, "skipping malformed mask geometry");
        }
    }
}

/// Reproject polygons vertex-wise into EPSG:3857. No densification.
pub fn reproject_polygons(polygons: Vec<Polygon<f64>>, srid: Srid) -> Vec<Polygon<f64>> {
    match srid {
        Srid::Epsg3857 => polygons,
        Srid::Epsg4326 => polygons
            .into_iter()
            .map(|p| {
                p.map_coords(|Coord { x, y }| {
                    let (x, y) = reproject_point(x, y, Srid::Epsg4326);
                    Coord { x, y }
                })
            })
            .collect(),
    }
}

/// Check whether a point lies inside any of the polygons.
pub fn point_in_any(polygons: &[Polygon<f64>], x: f64, y: f64) -> bool {
    let point = Point::new(x, y);
    polygons.iter().any(|p| p.contains(&point))
}
