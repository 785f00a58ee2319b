//! Integer rasters with a NoData sentinel.
//!
//! Every pipeline stage consumes and produces this type. Arithmetic is
//! NoData-absorbing: a cell is only data if every input that contributed to
//! it was data.

use rayon::prelude::*;

use crate::error::{OverlayError, OverlayResult};
use crate::extent::RasterExtent;

/// Sentinel cell value denoting absence of a measurement.
pub const NODATA: i32 = i32::MIN;

/// Check whether a cell value carries data.
#[inline]
pub fn is_data(v: i32) -> bool {
    v != NODATA
}

/// A 2-D grid of signed integer cells plus its geospatial extent.
///
/// Cells are stored row-major with a top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub raster_extent: RasterExtent,
    pub cells: Vec<i32>,
}

impl Raster {
    /// Create a raster from cells, validating the cell count.
    pub fn new(raster_extent: RasterExtent, cells: Vec<i32>) -> OverlayResult<Self> {
        if cells.len() != raster_extent.len() {
            return Err(OverlayError::DimensionMismatch(format!(
                "expected {}x{}={} cells, got {}",
                raster_extent.cols,
                raster_extent.rows,
                raster_extent.len(),
                cells.len()
            )));
        }
        Ok(Self {
            raster_extent,
            cells,
        })
    }

    /// A raster with every cell set to `value`.
    pub fn filled(raster_extent: RasterExtent, value: i32) -> Self {
        Self {
            cells: vec![value; raster_extent.len()],
            raster_extent,
        }
    }

    /// An all-NoData raster.
    pub fn nodata(raster_extent: RasterExtent) -> Self {
        Self::filled(raster_extent, NODATA)
    }

    pub fn cols(&self) -> usize {
        self.raster_extent.cols
    }

    pub fn rows(&self) -> usize {
        self.raster_extent.rows
    }

    /// Cell value at a grid position. Panics on out-of-range indices.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> i32 {
        self.cells[row * self.cols() + col]
    }

    /// Cell value at projected coordinates; NoData outside the extent.
    pub fn value_at(&self, x: f64, y: f64) -> i32 {
        match self.raster_extent.map_to_grid(x, y) {
            Some((col, row)) => self.get(col, row),
            None => NODATA,
        }
    }

    /// Apply `f` to every data cell; NoData cells pass through untouched.
    pub fn map_data(mut self, f: impl Fn(i32) -> i32 + Sync) -> Self {
        self.cells.par_iter_mut().for_each(|cell| {
            if is_data(*cell) {
                *cell = f(*cell);
            }
        });
        self
    }

    /// Keep cells where `keep(col, row, value)` holds; the rest become NoData.
    ///
    /// `keep` is only consulted for data cells.
    pub fn retain(mut self, keep: impl Fn(usize, usize, i32) -> bool + Sync) -> Self {
        let cols = self.cols();
        self.cells
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(row, cells)| {
                for (col, cell) in cells.iter_mut().enumerate() {
                    if is_data(*cell) && !keep(col, row, *cell) {
                        *cell = NODATA;
                    }
                }
            });
        self
    }

    /// Combine two rasters cellwise with absorbing NoData.
    ///
    /// Fails with `DimensionMismatch` when the grids disagree on size.
    pub fn combine(mut self, other: &Raster, f: impl Fn(i32, i32) -> i32 + Sync) -> OverlayResult<Self> {
        if self.cols() != other.cols() || self.rows() != other.rows() {
            return Err(OverlayError::DimensionMismatch(format!(
                "{}x{} vs {}x{}",
                self.cols(),
                self.rows(),
                other.cols(),
                other.rows()
            )));
        }

        self.cells
            .par_iter_mut()
            .zip(other.cells.par_iter())
            .for_each(|(a, &b)| {
                *a = if is_data(*a) && is_data(b) {
                    f(*a, b)
                } else {
                    NODATA
                };
            });
        Ok(self)
    }

    /// Minimum and maximum over data cells; `None` for an all-NoData raster.
    pub fn min_max(&self) -> Option<(i32, i32)> {
        self.cells
            .iter()
            .filter(|&&v| is_data(v))
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Count of data cells.
    pub fn data_count(&self) -> usize {
        self.cells.iter().filter(|&&v| is_data(v)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::Extent;
    use test_utils::{constant_cells, ramp_cells};

    fn re(cols: usize, rows: usize) -> RasterExtent {
        RasterExtent::new(Extent::new(0.0, 0.0, 100.0, 100.0), cols, rows)
    }

    #[test]
    fn test_new_validates_cell_count() {
        assert!(Raster::new(re(4, 4), vec![0; 16]).is_ok());
        assert!(Raster::new(re(4, 4), vec![0; 15]).is_err());
    }

    #[test]
    fn test_map_data_skips_nodata() {
        let mut cells = constant_cells(4, 4, 2);
        cells[5] = NODATA;
        let r = Raster::new(re(4, 4), cells).unwrap().map_data(|v| v * 3);

        assert_eq!(r.cells[0], 6);
        assert_eq!(r.cells[5], NODATA);
    }

    #[test]
    fn test_combine_absorbs_nodata() {
        let mut left = constant_cells(2, 2, 1);
        left[3] = NODATA;
        let a = Raster::new(re(2, 2), left).unwrap();
        let b = Raster::new(re(2, 2), constant_cells(2, 2, 10)).unwrap();

        let sum = a.combine(&b, |x, y| x + y).unwrap();
        assert_eq!(sum.cells, vec![11, 11, 11, NODATA]);
    }

    #[test]
    fn test_combine_rejects_mismatched_dims() {
        let a = Raster::filled(re(2, 2), 1);
        let b = Raster::filled(re(4, 4), 1);
        assert!(a.combine(&b, |x, y| x + y).is_err());
    }

    #[test]
    fn test_retain_masks_to_nodata() {
        let r = Raster::new(re(4, 4), ramp_cells(4, 4)).unwrap();
        let masked = r.retain(|_, _, v| v >= 8);

        assert_eq!(masked.cells[..8], vec![NODATA; 8][..]);
        assert_eq!(masked.cells[8], 8);
        assert_eq!(masked.cells[15], 15);
    }

    #[test]
    fn test_min_max_ignores_nodata() {
        let mut cells = ramp_cells(4, 4);
        cells[0] = NODATA;
        let r = Raster::new(re(4, 4), cells).unwrap();
        assert_eq!(r.min_max(), Some((1, 15)));

        let empty = Raster::nodata(re(4, 4));
        assert_eq!(empty.min_max(), None);
    }

    #[test]
    fn test_value_at_outside_extent_is_nodata() {
        let r = Raster::filled(re(4, 4), 9);
        assert_eq!(r.value_at(50.0, 50.0), 9);
        assert_eq!(r.value_at(150.0, 50.0), NODATA);
    }
}
