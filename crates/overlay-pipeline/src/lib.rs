//! The overlay modeling pipeline.
//!
//! A request flows through a short pipeline over a swappable raster
//! source: weighted overlay, then the three mask stages (polygon, layer,
//! threshold), then one of the analytics (class breaks, histogram, point
//! sampling). The same pipeline serves both execution modes, an extent
//! mode that materializes an arbitrary window and a tile mode that
//! materializes exactly one web-map tile, by parameterizing on the
//! `RasterSource` that resolves layer names to rasters.

pub mod breaks;
pub mod histogram;
pub mod mask;
pub mod overlay;
pub mod sample;
pub mod source;

pub use breaks::class_breaks;
pub use histogram::{value_histogram, zonal_histogram};
pub use mask::{apply_masks, parse_layer_mask, polygon_mask, threshold_mask, LayerMask};
pub use overlay::weighted_overlay;
pub use sample::{parse_coords, sample_points, sample_points_batched, SamplePoint, SampledValue};
pub use source::{ExtentSource, MemorySource, RasterSource, TileSource};
