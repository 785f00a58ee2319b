//! Extents and raster grid geometry.

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// An axis-aligned bounding rectangle in projected coordinates.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For Web Mercator (EPSG:3857), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a `bbox` request field: "xmin,ymin,xmax,ymax".
    pub fn from_param(s: &str) -> Result<Self, OverlayError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(OverlayError::invalid(
                "bbox",
                format!("expected 'xmin,ymin,xmax,ymax', got '{}'", s),
            ));
        }

        let mut coords = [0.0f64; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part.trim().parse().map_err(|_| {
                OverlayError::invalid("bbox", format!("'{}' is not a number", part))
            })?;
        }

        Ok(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this extent intersects another.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two extents.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        if !self.intersects(other) {
            return None;
        }

        Some(Extent {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// The smallest extent covering both inputs.
    pub fn combine(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Check if a point is contained within this extent.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// An extent paired with integer column/row counts.
///
/// Defines the affine mapping between projected coordinates and cell
/// indices of a regular grid with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterExtent {
    pub extent: Extent,
    pub cols: usize,
    pub rows: usize,
}

impl RasterExtent {
    pub fn new(extent: Extent, cols: usize, rows: usize) -> Self {
        Self { extent, cols, rows }
    }

    /// Width of a single cell in coordinate units.
    pub fn cell_width(&self) -> f64 {
        self.extent.width() / self.cols as f64
    }

    /// Height of a single cell in coordinate units.
    pub fn cell_height(&self) -> f64 {
        self.extent.height() / self.rows as f64
    }

    /// Convert projected coordinates to the containing cell index.
    ///
    /// Returns `None` for coordinates outside the extent. Row 0 is at the
    /// top (maximum y).
    pub fn map_to_grid(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.extent.min_x) / self.cell_width()).floor() as i64;
        let row = ((self.extent.max_y - y) / self.cell_height()).floor() as i64;

        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return None;
        }

        Some((col as usize, row as usize))
    }

    /// Projected coordinates of a cell's center point.
    pub fn grid_to_map(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.extent.min_x + (col as f64 + 0.5) * self.cell_width();
        let y = self.extent.max_y - (row as f64 + 0.5) * self.cell_height();
        (x, y)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Check if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}
