//! Tile pyramid layouts.
//!
//! A catalog layer is stored as a pyramid of fixed-size tiles. Each zoom
//! level is described by a `LayoutDefinition` that maps projected
//! coordinates to tile keys and tile keys back to extents (the pyramid's
//! map transform, both directions).

use serde::{Deserialize, Serialize};

use crate::crs::WEB_MERCATOR_MAX;
use crate::extent::{Extent, RasterExtent};

/// A tile coordinate (x, y) within one zoom level's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    /// Column (x)
    pub x: u32,
    /// Row (y), 0 at the top
    pub y: u32,
}

impl TileKey {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One zoom level of a tile pyramid: the level's world extent plus the
/// grid of tiles laid over it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefinition {
    /// Full extent covered by the layout.
    pub extent: Extent,
    /// Number of tile columns.
    pub layout_cols: u32,
    /// Number of tile rows.
    pub layout_rows: u32,
    /// Cell columns per tile.
    pub tile_cols: usize,
    /// Cell rows per tile.
    pub tile_rows: usize,
}

impl LayoutDefinition {
    /// The standard Web Mercator layout for a zoom level: a 2^z by 2^z
    /// grid over the square world extent.
    pub fn web_mercator(zoom: u32, tile_cols: usize, tile_rows: usize) -> Self {
        let n = 1u32 << zoom;
        Self {
            extent: Extent::new(
                -WEB_MERCATOR_MAX,
                -WEB_MERCATOR_MAX,
                WEB_MERCATOR_MAX,
                WEB_MERCATOR_MAX,
            ),
            layout_cols: n,
            layout_rows: n,
            tile_cols,
            tile_rows,
        }
    }

    /// Width of one tile in coordinate units.
    pub fn tile_width(&self) -> f64 {
        self.extent.width() / self.layout_cols as f64
    }

    /// Height of one tile in coordinate units.
    pub fn tile_height(&self) -> f64 {
        self.extent.height() / self.layout_rows as f64
    }

    /// Width of one cell in coordinate units.
    pub fn cell_width(&self) -> f64 {
        self.tile_width() / self.tile_cols as f64
    }

    /// Find which tile contains a projected point. `None` outside the
    /// layout extent.
    pub fn tile_for(&self, x: f64, y: f64) -> Option<TileKey> {
        let col = ((x - self.extent.min_x) / self.tile_width()).floor() as i64;
        let row = ((self.extent.max_y - y) / self.tile_height()).floor() as i64;

        if col < 0 || row < 0 || col >= self.layout_cols as i64 || row >= self.layout_rows as i64 {
            return None;
        }

        Some(TileKey::new(col as u32, row as u32))
    }

    /// The projected extent of a tile.
    pub fn tile_extent(&self, key: TileKey) -> Extent {
        let min_x = self.extent.min_x + key.x as f64 * self.tile_width();
        let max_y = self.extent.max_y - key.y as f64 * self.tile_height();
        Extent::new(
            min_x,
            max_y - self.tile_height(),
            min_x + self.tile_width(),
            max_y,
        )
    }

    /// The raster grid of a tile: its extent at the layout's tile dimensions.
    pub fn raster_extent(&self, key: TileKey) -> RasterExtent {
        RasterExtent::new(self.tile_extent(key), self.tile_cols, self.tile_rows)
    }

    /// Inclusive key range of tiles overlapping an extent, clamped to the
    /// layout. `None` when the extent misses the layout entirely.
    pub fn tile_range(&self, extent: &Extent) -> Option<(TileKey, TileKey)> {
        if !self.extent.intersects(extent) {
            return None;
        }
        let clipped = self.extent.intersection(extent)?;

        let min_col = ((clipped.min_x - self.extent.min_x) / self.tile_width()).floor();
        let max_col = ((clipped.max_x - self.extent.min_x) / self.tile_width()).ceil() - 1.0;
        let min_row = ((self.extent.max_y - clipped.max_y) / self.tile_height()).floor();
        let max_row = ((self.extent.max_y - clipped.min_y) / self.tile_height()).ceil() - 1.0;

        let clamp = |v: f64, hi: u32| (v.max(0.0) as u32).min(hi - 1);
        Some((
            TileKey::new(
                clamp(min_col, self.layout_cols),
                clamp(min_row, self.layout_rows),
            ),
            TileKey::new(
                clamp(max_col, self.layout_cols),
                clamp(max_row, self.layout_rows),
            ),
        ))
    }
}
