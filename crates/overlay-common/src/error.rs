//! Error types for overlay-wps services.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for overlay pipeline operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Request faults ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    // === Catalog faults ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    // === Pipeline faults ===
    #[error("Raster dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("{0}")]
    UnableToCompute(String),

    // === Infrastructure faults ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl OverlayError {
    /// Build the `InvalidParameter` variant without the struct-literal noise.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        OverlayError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Status code reported for this error, both as the HTTP status and
    /// as the `statusCode` field of the error body.
    ///
    /// Every domain error is reported as 500; the error kind and message
    /// distinguish the fault.
    pub fn http_status_code(&self) -> u16 {
        500
    }

    /// Short machine-readable kind used in error responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayError::MissingParameter(_) => "missing-parameter",
            OverlayError::InvalidParameter { .. } => "invalid-parameter",
            OverlayError::UnsupportedCrs(_) => "unsupported-crs",
            OverlayError::LayerNotFound(_) => "layer-not-found",
            OverlayError::CatalogError(_) => "catalog-error",
            OverlayError::DimensionMismatch(_) => "dimension-mismatch",
            OverlayError::UnableToCompute(_) => "unable-to-compute",
            OverlayError::RenderError(_) => "render-error",
            OverlayError::Internal(_) => "internal-error",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::Internal(format!("JSON error: {}", err))
    }
}
