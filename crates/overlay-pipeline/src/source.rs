//! Raster source abstraction.
//!
//! Pipeline stages never talk to the catalog directly; they resolve layer
//! names through a `RasterSource`. The two production sources are the
//! extent-windowed reader and the single-tile reader. Every raster a
//! source returns for one pipeline run covers the same grid, which the
//! downstream stages verify (`DimensionMismatch` otherwise).

use async_trait::async_trait;
use std::collections::HashMap;

use overlay_catalog::Catalog;
use overlay_common::{LayoutDefinition, OverlayError, OverlayResult, Raster, RasterExtent, TileKey};

/// Resolves a layer name to a raster for the current request.
#[async_trait]
pub trait RasterSource: Send + Sync {
    async fn read(&self, layer: &str) -> OverlayResult<Raster>;
}

/// Extent mode: every layer is read as a window at the same target grid.
pub struct ExtentSource<'a> {
    catalog: &'a Catalog,
    target: RasterExtent,
}

impl<'a> ExtentSource<'a> {
    pub fn new(catalog: &'a Catalog, target: RasterExtent) -> Self {
        Self { catalog, target }
    }

    pub fn target(&self) -> RasterExtent {
        self.target
    }
}

#[async_trait]
impl RasterSource for ExtentSource<'_> {
    async fn read(&self, layer: &str) -> OverlayResult<Raster> {
        self.catalog.read_window(layer, self.target).await
    }
}

/// Tile mode: every layer is read as one z/x/y tile.
///
/// When a layer does not store the requested zoom (mask layers published
/// at fewer levels than the model layers), the tile is assembled from the
/// layer's nearest stored zoom instead of failing or silently skipping.
pub struct TileSource<'a> {
    catalog: &'a Catalog,
    zoom: u32,
    key: TileKey,
}

impl<'a> TileSource<'a> {
    pub fn new(catalog: &'a Catalog, zoom: u32, key: TileKey) -> Self {
        Self { catalog, zoom, key }
    }
}

#[async_trait]
impl RasterSource for TileSource<'_> {
    async fn read(&self, layer: &str) -> OverlayResult<Raster> {
        let metadata = self.catalog.metadata(layer)?;

        if metadata.layout(self.zoom).is_some() {
            let reader = self.catalog.tile_reader(layer, self.zoom)?;
            return reader.read(self.key).await;
        }

        let native = metadata
            .nearest_zoom(self.zoom)
            .ok_or_else(|| OverlayError::LayerNotFound(format!("{} (no zoom levels)", layer)))?;
        let native_layout = self
            .catalog
            .layout(layer, native)?;
        let requested =
            LayoutDefinition::web_mercator(self.zoom, native_layout.tile_cols, native_layout.tile_rows);

        self.catalog
            .read_window_at(layer, native, requested.raster_extent(self.key))
            .await
    }
}

/// An in-memory source over pre-built rasters.
///
/// Backs fixture-driven tests; also the natural seam for replaying
/// captured rasters through the pipeline without a catalog on disk.
#[derive(Debug, Default)]
pub struct MemorySource {
    rasters: HashMap<String, Raster>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, raster: Raster) -> Self {
        self.rasters.insert(name.into(), raster);
        self
    }
}

#[async_trait]
impl RasterSource for MemorySource {
    async fn read(&self, layer: &str) -> OverlayResult<Raster> {
        self.rasters
            .get(layer)
            .cloned()
            .ok_or_else(|| OverlayError::LayerNotFound(layer.to_string()))
    }
}
