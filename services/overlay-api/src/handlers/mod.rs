//! HTTP request handlers for the overlay modeling endpoints.
//!
//! This module is organized into submodules:
//! - `breaks`: class breaks over an extent
//! - `colors`: color ramp listing
//! - `health`: liveness probe
//! - `histogram`: zonal histogram of one layer
//! - `overlay`: weighted overlay rendered as a PNG over an extent
//! - `tile`: single web-map tile rendering
//! - `value`: point sampling (windowed and tile-reader variants)
//! - `common`: error serialization and shared response helpers

pub mod breaks;
pub mod colors;
pub mod common;
pub mod health;
pub mod histogram;
pub mod overlay;
pub mod tile;
pub mod value;

pub use breaks::breaks_handler;
pub use colors::colors_handler;
pub use common::{ApiError, ApiResult};
pub use health::health_handler;
pub use histogram::histogram_handler;
pub use overlay::weighted_overlay_handler;
pub use tile::tile_handler;
pub use value::{spark_value_handler, value_handler};
