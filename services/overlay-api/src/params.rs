//! Request parameter parsing.
//!
//! All model endpoints accept the same form-encoded vocabulary. Fields
//! arrive as raw strings and are parsed here into typed values, so a
//! malformed field surfaces as a `BadRequest`-class error instead of a
//! framework rejection. Geometry and layer-mask faults degrade silently
//! to "no mask" per the boundary policy.

use geo::Polygon;
use serde::Deserialize;

use overlay_common::geom::{parse_polygons, reproject_polygons};
use overlay_common::{crs::reproject_point, Extent, OverlayError, OverlayResult, Srid, NODATA};
use overlay_pipeline::{parse_layer_mask, LayerMask};
use overlay_renderer::Color;

/// Raw form fields shared by the model endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawParams {
    pub bbox: Option<String>,
    pub layers: Option<String>,
    pub weights: Option<String>,
    #[serde(rename = "numBreaks")]
    pub num_breaks: Option<String>,
    pub srid: Option<String>,
    pub threshold: Option<String>,
    #[serde(rename = "polyMask")]
    pub poly_mask: Option<String>,
    #[serde(rename = "layerMask")]
    pub layer_mask: Option<String>,
    pub palette: Option<String>,
    pub breaks: Option<String>,
    #[serde(rename = "colorRamp")]
    pub color_ramp: Option<String>,
    pub layer: Option<String>,
    pub coords: Option<String>,
    pub cols: Option<String>,
    pub rows: Option<String>,
}

/// The fully parsed model inputs: layers, weights, and the three masks,
/// with all geometry reprojected into EPSG:3857.
#[derive(Debug)]
pub struct ModelParams {
    pub layers: Vec<String>,
    pub weights: Vec<i32>,
    pub srid: Srid,
    pub threshold: i32,
    pub polygons: Vec<Polygon<f64>>,
    pub layer_mask: Option<LayerMask>,
}

impl ModelParams {
    pub fn from_raw(raw: &RawParams) -> OverlayResult<Self> {
        let srid = parse_srid(raw.srid.as_deref())?;

        let layers = parse_layers(raw.layers.as_deref())?;
        let weights = parse_weights(raw.weights.as_deref(), layers.len())?;

        let threshold = match raw.threshold.as_deref() {
            None | Some("") => NODATA,
            Some(s) => s.trim().parse().map_err(|_| {
                OverlayError::invalid("threshold", format!("'{}' is not an integer", s))
            })?,
        };

        let polygons = reproject_polygons(
            parse_polygons(raw.poly_mask.as_deref().unwrap_or_default()),
            srid,
        );
        let layer_mask = parse_layer_mask(raw.layer_mask.as_deref().unwrap_or_default());

        Ok(Self {
            layers,
            weights,
            srid,
            threshold,
            polygons,
            layer_mask,
        })
    }
}

/// Parse `srid`: a non-integer is a bad request; an integer outside the
/// supported pair is an unsupported CRS. Defaults to Web Mercator.
pub fn parse_srid(raw: Option<&str>) -> OverlayResult<Srid> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(Srid::Epsg3857);
    };
    raw.trim()
        .parse::<u32>()
        .map_err(|_| OverlayError::invalid("srid", format!("'{}' is not an integer", raw)))?;
    Srid::from_param(raw)
}

/// Parse the request bbox into an EPSG:3857 extent.
pub fn parse_bbox(raw: Option<&str>, srid: Srid) -> OverlayResult<Extent> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| OverlayError::MissingParameter("bbox".to_string()))?;
    let extent = Extent::from_param(raw)?;

    // Web Mercator is monotonic in both axes, so corners map to corners.
    let (min_x, min_y) = reproject_point(extent.min_x, extent.min_y, srid);
    let (max_x, max_y) = reproject_point(extent.max_x, extent.max_y, srid);
    Ok(Extent::new(min_x, min_y, max_x, max_y))
}

fn parse_layers(raw: Option<&str>) -> OverlayResult<Vec<String>> {
    let layers: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if layers.is_empty() {
        return Err(OverlayError::MissingParameter("layers".to_string()));
    }
    Ok(layers)
}

fn parse_weights(raw: Option<&str>, layer_count: usize) -> OverlayResult<Vec<i32>> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| OverlayError::MissingParameter("weights".to_string()))?;

    let weights = raw
        .split(',')
        .map(|s| {
            s.trim().parse::<i32>().map_err(|_| {
                OverlayError::invalid("weights", format!("'{}' is not an integer", s.trim()))
            })
        })
        .collect::<OverlayResult<Vec<i32>>>()?;

    if weights.len() != layer_count {
        return Err(OverlayError::invalid(
            "weights",
            format!("{} weights for {} layers", weights.len(), layer_count),
        ));
    }
    Ok(weights)
}

/// Parse `numBreaks`, a positive integer.
pub fn parse_num_breaks(raw: Option<&str>) -> OverlayResult<usize> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| OverlayError::MissingParameter("numBreaks".to_string()))?;
    let n: usize = raw
        .trim()
        .parse()
        .map_err(|_| OverlayError::invalid("numBreaks", format!("'{}' is not an integer", raw)))?;
    if n == 0 {
        return Err(OverlayError::invalid("numBreaks", "must be positive"));
    }
    Ok(n)
}

/// Parse an optional grid-size override (`cols` / `rows`).
pub fn parse_dimension(raw: Option<&str>, name: &str, default: usize) -> OverlayResult<usize> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(default);
    };
    let n: usize = raw
        .trim()
        .parse()
        .map_err(|_| OverlayError::invalid(name, format!("'{}' is not an integer", raw)))?;
    if n == 0 {
        return Err(OverlayError::invalid(name, "must be positive"));
    }
    Ok(n)
}

/// Parse the render-time `breaks` field: comma-separated integers.
pub fn parse_breaks(raw: Option<&str>) -> OverlayResult<Option<Vec<i32>>> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|s| {
            s.trim().parse::<i32>().map_err(|_| {
                OverlayError::invalid("breaks", format!("'{}' is not an integer", s.trim()))
            })
        })
        .collect::<OverlayResult<Vec<i32>>>()
        .map(Some)
}

/// Parse the `palette` field: comma-separated hex colors ("RRGGBB" or
/// "RRGGBBAA", with optional "#" or "0x" prefix).
pub fn parse_palette(raw: Option<&str>) -> OverlayResult<Option<Vec<Color>>> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|s| parse_hex_color(s.trim()))
        .collect::<OverlayResult<Vec<Color>>>()
        .map(Some)
}

fn parse_hex_color(s: &str) -> OverlayResult<Color> {
    let hex = s
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    let bad = || OverlayError::invalid("palette", format!("'{}' is not a hex color", s));

    match hex.len() {
        6 => {
            let v = u32::from_str_radix(hex, 16).map_err(|_| bad())?;
            Ok(Color::opaque((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        8 => {
            let v = u32::from_str_radix(hex, 16).map_err(|_| bad())?;
            Ok(Color::new(
                (v >> 24) as u8,
                (v >> 16) as u8,
                (v >> 8) as u8,
                v as u8,
            ))
        }
        _ => Err(bad()),
    }
}

/// The single layer named by a histogram or sampling request: `layer`,
/// falling back to the first entry of `layers`.
pub fn parse_single_layer(raw: &RawParams) -> OverlayResult<String> {
    if let Some(layer) = raw.layer.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(layer.to_string());
    }
    parse_layers(raw.layers.as_deref()).map(|mut layers| layers.remove(0))
}
