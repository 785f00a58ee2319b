//! Test catalog builders.
//!
//! Writes small catalogs into a directory (typically a temp dir) for unit
//! and integration tests. Production catalogs are produced by an external
//! ingestion pipeline; only the layout here is shared.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use overlay_common::{LayoutDefinition, TileKey};

use crate::layer::LayerMetadata;

/// Write a layer's `metadata.json`.
pub fn write_metadata(
    root: &Path,
    name: &str,
    zooms: &BTreeMap<u32, LayoutDefinition>,
) -> io::Result<()> {
    let metadata = LayerMetadata {
        srid: 3857,
        zooms: zooms.clone(),
    };
    let dir = root.join(name);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(
        dir.join("metadata.json"),
        serde_json::to_vec_pretty(&metadata)?,
    )
}

/// Write one tile blob for a layer.
pub fn write_tile(root: &Path, name: &str, zoom: u32, key: TileKey, cells: &[i32]) -> io::Result<()> {
    let dir = root.join(name).join(zoom.to_string());
    std::fs::create_dir_all(&dir)?;

    let mut bytes = Vec::with_capacity(cells.len() * 4);
    for cell in cells {
        bytes.extend_from_slice(&cell.to_le_bytes());
    }
    std::fs::write(dir.join(format!("{}_{}.tile", key.x, key.y)), bytes)
}

/// Write a complete layer: metadata plus the given tiles per zoom.
///
/// Zoom levels use the standard Web Mercator layout. Tiles not listed are
/// simply absent and read back as NoData.
pub fn write_layer(
    root: &Path,
    name: &str,
    tile_cols: usize,
    tile_rows: usize,
    zooms: &[(u32, Vec<(TileKey, Vec<i32>)>)],
) -> io::Result<()> {
    let layouts: BTreeMap<u32, LayoutDefinition> = zooms
        .iter()
        .map(|(z, _)| (*z, LayoutDefinition::web_mercator(*z, tile_cols, tile_rows)))
        .collect();
    write_metadata(root, name, &layouts)?;

    for (zoom, tiles) in zooms {
        for (key, cells) in tiles {
            write_tile(root, name, *zoom, *key, cells)?;
        }
    }
    Ok(())
}

/// Write a zoom-0 layer: a single world-covering tile.
pub fn write_world_layer(
    root: &Path,
    name: &str,
    tile_cols: usize,
    tile_rows: usize,
    cells: Vec<i32>,
) -> io::Result<()> {
    write_layer(
        root,
        name,
        tile_cols,
        tile_rows,
        &[(0, vec![(TileKey::new(0, 0), cells)])],
    )
}
