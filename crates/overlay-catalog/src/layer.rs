//! Layer metadata: per-zoom pyramid layouts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use overlay_common::LayoutDefinition;

/// Metadata published by a catalog layer.
///
/// Describes the layer's CRS and, for every stored zoom level, the layout
/// that maps projected coordinates to tile keys and back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerMetadata {
    /// EPSG code of the stored data. All catalog layers are Web Mercator.
    pub srid: u32,
    /// Stored zoom levels and their layouts.
    pub zooms: BTreeMap<u32, LayoutDefinition>,
}

impl LayerMetadata {
    /// The layout for a stored zoom, if present.
    pub fn layout(&self, zoom: u32) -> Option<&LayoutDefinition> {
        self.zooms.get(&zoom)
    }

    /// Highest stored zoom (the layer's native resolution).
    pub fn max_zoom(&self) -> Option<u32> {
        self.zooms.keys().next_back().copied()
    }

    /// The stored zoom closest to a requested zoom: the zoom itself when
    /// stored, otherwise the greatest stored zoom below it, otherwise the
    /// lowest stored zoom.
    pub fn nearest_zoom(&self, zoom: u32) -> Option<u32> {
        if self.zooms.contains_key(&zoom) {
            return Some(zoom);
        }
        self.zooms
            .range(..zoom)
            .next_back()
            .or_else(|| self.zooms.range(zoom..).next())
            .map(|(z, _)| *z)
    }

    /// The lowest stored zoom whose cells are at least as fine as the
    /// requested cell width, falling back to the native zoom.
    pub fn zoom_for_cell_width(&self, cell_width: f64) -> Option<u32> {
        self.zooms
            .iter()
            .find(|(_, layout)| layout.cell_width() <= cell_width)
            .map(|(z, _)| *z)
            .or_else(|| self.max_zoom())
    }
}
