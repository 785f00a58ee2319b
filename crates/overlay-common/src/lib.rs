//! Common types and utilities shared across all overlay-wps crates.

pub mod crs;
pub mod error;
pub mod extent;
pub mod geom;
pub mod raster;
pub mod tile;

pub use crs::Srid;
pub use error::{OverlayError, OverlayResult};
pub use extent::{Extent, RasterExtent};
pub use raster::{is_data, Raster, NODATA};
pub use tile::{LayoutDefinition, TileKey};
