//! Layer catalog access for overlay-wps.
//!
//! A catalog is a read-only directory tree of pre-tiled, map-projected
//! raster layers:
//!
//! ```text
//! <root>/<layer>/metadata.json        layer CRS and per-zoom layouts
//! <root>/<layer>/<zoom>/<x>_<y>.tile  little-endian i32 cells, row-major
//! ```
//!
//! The catalog handle is opened once at startup and shared across
//! requests; all reads are immutable and thread-safe.

pub mod catalog;
pub mod layer;
pub mod testdata;

pub use catalog::{Catalog, TileReader};
pub use layer::LayerMetadata;
