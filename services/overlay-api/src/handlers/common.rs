//! Shared handler utilities: error serialization and response builders.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use overlay_common::OverlayError;
use overlay_renderer::{ramp_or_default, Color, ColorRamp, DEFAULT_RAMP};

/// Handler result carrying the service error wrapper.
pub type ApiResult<T> = Result<T, ApiError>;

/// Newtype so pipeline errors serialize at the HTTP boundary as
/// `{status, statusCode, message}`.
///
/// Every domain error responds with HTTP 500; the body's `statusCode`
/// mirrors it and the kind and message carry the detail.
#[derive(Debug)]
pub struct ApiError(pub OverlayError);

impl From<OverlayError> for ApiError {
    fn from(err: OverlayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_fault = matches!(
            self.0,
            OverlayError::MissingParameter(_)
                | OverlayError::InvalidParameter { .. }
                | OverlayError::UnsupportedCrs(_)
                | OverlayError::LayerNotFound(_)
        );
        if request_fault {
            warn!(kind = self.0.kind(), error = %self.0, "request rejected");
        } else {
            error!(kind = self.0.kind(), error = %self.0, "request failed");
        }

        let body = Json(serde_json::json!({
            "status": "error",
            "statusCode": self.0.http_status_code(),
            "message": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// An `image/png` response.
pub fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Resolve the colors for a render: an explicit palette wins (resampled
/// if its length disagrees with the break count), otherwise the named
/// ramp, otherwise the default ramp.
pub fn render_colors(
    palette: Option<Vec<Color>>,
    ramp_name: Option<&str>,
    break_count: usize,
) -> Vec<Color> {
    match palette {
        Some(colors) if colors.len() == break_count => colors,
        Some(colors) => ColorRamp::new(colors).interpolate(break_count),
        None => ramp_or_default(ramp_name.unwrap_or(DEFAULT_RAMP)).interpolate(break_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_colors_prefers_exact_palette() {
        let palette = vec![Color::opaque(1, 1, 1), Color::opaque(2, 2, 2)];
        let colors = render_colors(Some(palette.clone()), None, 2);
        assert_eq!(colors, palette);
    }

    #[test]
    fn test_render_colors_resamples_short_palette() {
        let palette = vec![Color::opaque(0, 0, 0), Color::opaque(100, 100, 100)];
        let colors = render_colors(Some(palette), None, 3);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[1], Color::opaque(50, 50, 50));
    }

    #[test]
    fn test_render_colors_falls_back_to_ramp() {
        let named = render_colors(None, Some("blue-to-red"), 4);
        let defaulted = render_colors(None, None, 4);
        assert_eq!(named, defaulted);
        assert_eq!(named.len(), 4);
    }
}
