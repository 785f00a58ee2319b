//! Filesystem-backed tile catalog.

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use overlay_common::{
    LayoutDefinition, OverlayError, OverlayResult, Raster, RasterExtent, TileKey, NODATA,
};

use crate::layer::LayerMetadata;

/// A read-only catalog of pre-tiled raster layers rooted at a directory.
///
/// Layer metadata is loaded once at open; tile cells are read on demand.
/// The handle is cheap to share behind an `Arc` and safe to use from
/// concurrent requests.
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    layers: HashMap<String, LayerMetadata>,
}

impl Catalog {
    /// Open a catalog, scanning every `<layer>/metadata.json` under `root`.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub async fn open(root: impl AsRef<Path>) -> OverlayResult<Self> {
        let root = root.as_ref().to_path_buf();
        let mut layers = HashMap::new();

        let mut entries = tokio::fs::read_dir(&root)
            .await
            .map_err(|e| OverlayError::CatalogError(format!("cannot open catalog root: {}", e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OverlayError::CatalogError(e.to_string()))?
        {
            let meta_path = entry.path().join("metadata.json");
            if !meta_path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let raw = tokio::fs::read(&meta_path)
                .await
                .map_err(|e| OverlayError::CatalogError(format!("{}: {}", name, e)))?;
            let metadata: LayerMetadata = serde_json::from_slice(&raw)
                .map_err(|e| OverlayError::CatalogError(format!("{}: bad metadata: {}", name, e)))?;
            layers.insert(name, metadata);
        }

        info!(layer_count = layers.len(), "catalog opened");
        Ok(Self { root, layers })
    }

    /// Names of every layer in the catalog.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.keys().map(String::as_str).collect()
    }

    /// Metadata for a layer. `LayerNotFound` if absent.
    pub fn metadata(&self, name: &str) -> OverlayResult<&LayerMetadata> {
        self.layers
            .get(name)
            .ok_or_else(|| OverlayError::LayerNotFound(name.to_string()))
    }

    /// The layout of `(name, zoom)`. `LayerNotFound` when the layer does
    /// not store that zoom.
    pub fn layout(&self, name: &str, zoom: u32) -> OverlayResult<LayoutDefinition> {
        self.metadata(name)?
            .layout(zoom)
            .copied()
            .ok_or_else(|| OverlayError::LayerNotFound(format!("{} (zoom {})", name, zoom)))
    }

    /// A tile reader over `(name, zoom)`: a pure function from tile keys
    /// to rasters. Missing tiles read as all-NoData tiles of the layout's
    /// tile dimensions, so partial coverage at window edges still renders.
    pub fn tile_reader(&self, name: &str, zoom: u32) -> OverlayResult<TileReader<'_>> {
        let layout = self.layout(name, zoom)?;
        Ok(TileReader {
            root: &self.root,
            name: name.to_string(),
            zoom,
            layout,
        })
    }

    /// Read a raster covering exactly `target`, choosing the stored zoom
    /// whose resolution best matches the target grid.
    pub async fn read_window(&self, name: &str, target: RasterExtent) -> OverlayResult<Raster> {
        let zoom = self
            .metadata(name)?
            .zoom_for_cell_width(target.cell_width())
            .ok_or_else(|| OverlayError::LayerNotFound(format!("{} (no zoom levels)", name)))?;
        self.read_window_at(name, zoom, target).await
    }

    /// Read a raster covering exactly `target` from a pinned zoom level.
    ///
    /// Overlapping native tiles are read concurrently and resampled
    /// nearest-neighbor into the target grid. Cells outside native
    /// coverage are NoData.
    #[instrument(skip_all, fields(layer = name, zoom = zoom))]
    pub async fn read_window_at(
        &self,
        name: &str,
        zoom: u32,
        target: RasterExtent,
    ) -> OverlayResult<Raster> {
        let reader = self.tile_reader(name, zoom)?;
        let layout = reader.layout;

        let Some((lo, hi)) = layout.tile_range(&target.extent) else {
            return Ok(Raster::nodata(target));
        };

        let mut keys = Vec::new();
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                keys.push(TileKey::new(x, y));
            }
        }
        debug!(tiles = keys.len(), "assembling window");

        let tiles = futures::future::try_join_all(keys.iter().map(|&key| reader.read(key))).await?;
        let by_key: HashMap<TileKey, Raster> = keys.into_iter().zip(tiles).collect();

        // Nearest-neighbor resample into the target grid by cell center.
        let mut cells = vec![NODATA; target.len()];
        cells
            .par_chunks_mut(target.cols)
            .enumerate()
            .for_each(|(row, out_row)| {
                for (col, cell) in out_row.iter_mut().enumerate() {
                    let (x, y) = target.grid_to_map(col, row);
                    if let Some(key) = layout.tile_for(x, y) {
                        if let Some(tile) = by_key.get(&key) {
                            *cell = tile.value_at(x, y);
                        }
                    }
                }
            });

        Raster::new(target, cells)
    }
}

/// A pure `TileKey -> Raster` reader over one `(layer, zoom)`.
#[derive(Debug)]
pub struct TileReader<'a> {
    root: &'a Path,
    name: String,
    zoom: u32,
    layout: LayoutDefinition,
}

impl TileReader<'_> {
    pub fn layout(&self) -> &LayoutDefinition {
        &self.layout
    }

    /// Read one tile. A missing tile file yields an all-NoData tile.
    pub async fn read(&self, key: TileKey) -> OverlayResult<Raster> {
        let raster_extent = self.layout.raster_extent(key);
        let path = self
            .root
            .join(&self.name)
            .join(self.zoom.to_string())
            .join(format!("{}_{}.tile", key.x, key.y));

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(layer = %self.name, zoom = self.zoom, x = key.x, y = key.y, "missing tile, reading as NoData");
                return Ok(Raster::nodata(raster_extent));
            }
            Err(e) => {
                return Err(OverlayError::CatalogError(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        decode_tile(&bytes, raster_extent).map_err(|msg| {
            OverlayError::CatalogError(format!("{}: {}", path.display(), msg))
        })
    }
}

/// Decode little-endian i32 cells into a raster of the expected size.
fn decode_tile(bytes: &[u8], raster_extent: RasterExtent) -> Result<Raster, String> {
    let expected = raster_extent.len() * 4;
    if bytes.len() != expected {
        return Err(format!(
            "expected {} bytes for a {}x{} tile, got {}",
            expected,
            raster_extent.cols,
            raster_extent.rows,
            bytes.len()
        ));
    }

    let cells = bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    // Cell count was validated against the byte length above.
    Ok(Raster {
        raster_extent,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::Extent;

    #[test]
    fn test_decode_tile_rejects_short_payload() {
        let re = RasterExtent::new(Extent::new(0.0, 0.0, 1.0, 1.0), 2, 2);
        assert!(decode_tile(&[0u8; 12], re).is_err());
    }

    #[test]
    fn test_decode_tile_little_endian() {
        let re = RasterExtent::new(Extent::new(0.0, 0.0, 1.0, 1.0), 2, 1);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7i32.to_le_bytes());
        bytes.extend_from_slice(&NODATA.to_le_bytes());

        let raster = decode_tile(&bytes, re).unwrap();
        assert_eq!(raster.cells, vec![7, NODATA]);
    }
}
