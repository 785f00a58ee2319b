//! Color ramp listing.

use axum::Json;
use serde_json::{json, Value};

use overlay_renderer::ramp_names;

/// `GET /gt/colors`: available ramp names with their color stops.
pub async fn colors_handler() -> Json<Value> {
    let ramps: serde_json::Map<String, Value> = ramp_names()
        .map(|(name, ramp)| {
            let stops: Vec<String> = ramp.stops().iter().map(|c| c.to_hex()).collect();
            (name.to_string(), json!(stops))
        })
        .collect();

    Json(json!({ "ramps": ramps }))
}
