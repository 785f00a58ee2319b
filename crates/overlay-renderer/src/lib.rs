//! Rendering: color ramps, break-bucket colorization, and PNG encoding.

pub mod png;
pub mod ramp;
pub mod render;

pub use png::{create_png, create_png_indexed};
pub use ramp::{ramp_names, ramp_or_default, Color, ColorRamp, DEFAULT_RAMP};
pub use render::render_png;
