//! Pipeline integration tests over a temp-dir catalog.

use overlay_catalog::{testdata, Catalog};
use overlay_pipeline::{
    apply_masks, parse_coords, sample_points, sample_points_batched, weighted_overlay,
    ExtentSource, LayerMask, RasterSource, TileSource,
};
use overlay_common::{LayoutDefinition, RasterExtent, Srid, TileKey, NODATA};
use test_utils::{constant_cells, split_cells};

const TILE: usize = 16;

fn world_grid(cols: usize, rows: usize) -> RasterExtent {
    RasterExtent::new(LayoutDefinition::web_mercator(0, TILE, TILE).extent, cols, rows)
}

async fn catalog_with(
    dir: &std::path::Path,
    layers: &[(&str, Vec<i32>)],
) -> Catalog {
    for (name, cells) in layers {
        testdata::write_world_layer(dir, name, TILE, TILE, cells.clone()).unwrap();
    }
    Catalog::open(dir).await.unwrap()
}

#[tokio::test]
async fn test_extent_mode_overlay_with_masks() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_with(
        dir.path(),
        &[
            ("a", constant_cells(TILE, TILE, 2)),
            ("b", constant_cells(TILE, TILE, 3)),
            ("m", split_cells(TILE, TILE, 10, 20)),
        ],
    )
    .await;

    let source = ExtentSource::new(&catalog, world_grid(TILE, TILE));
    let layers = vec!["a".to_string(), "b".to_string()];

    let fused = weighted_overlay(&source, &layers, &[2, 1]).await.unwrap();
    assert!(fused.cells.iter().all(|&v| v == 7));

    // Layer mask keeps the left half, threshold keeps everything (7 >= 7).
    let masks = LayerMask::from([("m".to_string(), vec![10])]);
    let masked = apply_masks(&source, fused, &[], Some(&masks), 7).await.unwrap();

    assert_eq!(masked.get(0, 0), 7);
    assert_eq!(masked.get(TILE - 1, 0), NODATA);
    assert_eq!(masked.data_count(), TILE / 2 * TILE);
}

#[tokio::test]
async fn test_tile_mode_matches_extent_mode() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_with(dir.path(), &[("a", constant_cells(TILE, TILE, 4))]).await;
    let layers = vec!["a".to_string()];

    let tile_source = TileSource::new(&catalog, 0, TileKey::new(0, 0));
    let from_tile = weighted_overlay(&tile_source, &layers, &[2]).await.unwrap();

    let extent_source = ExtentSource::new(&catalog, world_grid(TILE, TILE));
    let from_extent = weighted_overlay(&extent_source, &layers, &[2]).await.unwrap();

    assert_eq!(from_tile.cells, from_extent.cells);
    assert_eq!(from_tile.raster_extent, from_extent.raster_extent);
}

#[tokio::test]
async fn test_tile_mode_mask_layer_falls_back_to_native_zoom() {
    let dir = tempfile::tempdir().unwrap();
    // Model layer stored at zoom 1; mask layer only at zoom 0.
    let z1_tiles: Vec<(TileKey, Vec<i32>)> = (0..2u32)
        .flat_map(|y| (0..2u32).map(move |x| (TileKey::new(x, y), constant_cells(TILE, TILE, 5))))
        .collect();
    testdata::write_layer(dir.path(), "model", TILE, TILE, &[(1, z1_tiles)]).unwrap();
    testdata::write_world_layer(
        dir.path(),
        "mask",
        TILE,
        TILE,
        split_cells(TILE, TILE, 1, 2),
    )
    .unwrap();
    let catalog = Catalog::open(dir.path()).await.unwrap();

    // North-west zoom-1 tile lies entirely in the left half of the world,
    // where the zoom-0 mask layer holds value 1.
    let source = TileSource::new(&catalog, 1, TileKey::new(0, 0));
    let mask_raster = source.read("mask").await.unwrap();

    assert_eq!(mask_raster.cols(), TILE);
    assert_eq!(mask_raster.rows(), TILE);
    assert!(mask_raster.cells.iter().all(|&v| v == 1));

    // And the full pipeline applies it.
    let fused = weighted_overlay(&source, &["model".to_string()], &[1]).await.unwrap();
    let masks = LayerMask::from([("mask".to_string(), vec![1])]);
    let masked = apply_masks(&source, fused, &[], Some(&masks), NODATA).await.unwrap();
    assert!(masked.cells.iter().all(|&v| v == 5));
}

#[tokio::test]
async fn test_sampling_variants_agree() {
    let dir = tempfile::tempdir().unwrap();
    let mut cells = constant_cells(TILE, TILE, 42);
    cells[0] = 7; // distinguish the north-west corner cell
    let catalog = catalog_with(dir.path(), &[("elevation", cells)]).await;

    let world = LayoutDefinition::web_mercator(0, TILE, TILE).extent;
    let cell = world.width() / TILE as f64;

    // One point per corner cell center, plus one far outside coverage.
    let coords = format!(
        "nw,{},{},se,{},{},out,{},{}",
        world.min_x + cell / 2.0,
        world.max_y - cell / 2.0,
        world.max_x - cell / 2.0,
        world.min_y + cell / 2.0,
        world.max_x * 3.0,
        0.0,
    );
    let points = parse_coords(&coords, Srid::Epsg3857);
    assert_eq!(points.len(), 3);

    let one_by_one = sample_points(&catalog, "elevation", &points).await.unwrap();
    let batched = sample_points_batched(&catalog, "elevation", &points).await.unwrap();
    assert_eq!(one_by_one, batched);

    assert_eq!(one_by_one[0].id, "nw");
    assert_eq!(one_by_one[0].value, 7);
    assert_eq!(one_by_one[1].value, 42);
    assert_eq!(one_by_one[2].value, NODATA);
}
