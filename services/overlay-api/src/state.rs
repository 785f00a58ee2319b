//! Application state and shared resources.

use std::env;
use std::path::{Path, PathBuf};

use overlay_catalog::Catalog;
use overlay_common::OverlayResult;

/// Default working-grid resolution for extent-mode analytics.
pub const DEFAULT_BREAKS_RESOLUTION: usize = 256;

/// Service configuration with environment-variable fallbacks.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Root directory of the tile catalog.
    pub catalog_root: PathBuf,
    /// Working-grid resolution (cols and rows) for extent-mode breaks and
    /// histograms when the request does not override it.
    pub breaks_resolution: usize,
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides and the environment.
    pub fn resolve(catalog_root: Option<PathBuf>, breaks_resolution: Option<usize>) -> Self {
        fn parse_usize(key: &str, default: usize) -> usize {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        let catalog_root = catalog_root
            .or_else(|| env::var("CATALOG_ROOT").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("./catalog"));

        let breaks_resolution = breaks_resolution
            .unwrap_or_else(|| parse_usize("BREAKS_RESOLUTION", DEFAULT_BREAKS_RESOLUTION));

        Self {
            catalog_root,
            breaks_resolution,
        }
    }
}

/// Shared application state.
///
/// The catalog handle is opened once at startup and is read-only for the
/// life of the process; no other state is shared across requests.
pub struct AppState {
    pub catalog: Catalog,
    pub breaks_resolution: usize,
}

impl AppState {
    pub async fn new(config: &ServiceConfig) -> OverlayResult<Self> {
        Ok(Self {
            catalog: Catalog::open(&config.catalog_root).await?,
            breaks_resolution: config.breaks_resolution,
        })
    }

    /// Open state over an explicit catalog root with defaults elsewhere.
    pub async fn open(catalog_root: &Path) -> OverlayResult<Self> {
        Ok(Self {
            catalog: Catalog::open(catalog_root).await?,
            breaks_resolution: DEFAULT_BREAKS_RESOLUTION,
        })
    }
}
