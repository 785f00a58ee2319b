//! Renderer integration tests: colorization semantics at the PNG level.

use overlay_renderer::render::render_png_with_colors;
use overlay_renderer::{render_png, Color};
use overlay_common::{Extent, Raster, RasterExtent, NODATA};
use test_utils::split_cells;

fn raster(cells: Vec<i32>, cols: usize, rows: usize) -> Raster {
    let re = RasterExtent::new(Extent::new(0.0, 0.0, 1.0, 1.0), cols, rows);
    Raster::new(re, cells).unwrap()
}

/// Minimal chunk scan: returns (type, data) pairs.
fn chunks(png: &[u8]) -> Vec<(String, Vec<u8>)> {
    assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let mut out = Vec::new();
    let mut offset = 8;
    while offset + 8 <= png.len() {
        let len = u32::from_be_bytes(png[offset..offset + 4].try_into().unwrap()) as usize;
        let kind = String::from_utf8_lossy(&png[offset + 4..offset + 8]).into_owned();
        let data = png[offset + 8..offset + 8 + len].to_vec();
        out.push((kind, data));
        offset += 12 + len;
    }
    out
}

fn chunk<'a>(chunks: &'a [(String, Vec<u8>)], kind: &str) -> Option<&'a [u8]> {
    chunks.iter().find(|(k, _)| k == kind).map(|(_, d)| d.as_slice())
}

/// Decompress the IDAT stream and strip per-row filter bytes.
fn decode_indices(png: &[u8], width: usize, height: usize) -> Vec<u8> {
    use std::io::Read;

    let parsed = chunks(png);
    let idat = chunk(&parsed, "IDAT").expect("IDAT present");

    let mut decoder = flate2::read::ZlibDecoder::new(idat);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).unwrap();
    assert_eq!(raw.len(), height * (1 + width));

    let mut indices = Vec::with_capacity(width * height);
    for row in raw.chunks_exact(1 + width) {
        assert_eq!(row[0], 0, "filter byte");
        indices.extend_from_slice(&row[1..]);
    }
    indices
}

#[test]
fn test_all_nodata_renders_fully_transparent() {
    let r = raster(vec![NODATA; 16], 4, 4);
    let png = render_png(&r, &[1, 2, 3], "blue-to-red").unwrap();

    let parsed = chunks(&png);
    let plte = chunk(&parsed, "PLTE").unwrap();
    let trns = chunk(&parsed, "tRNS").unwrap();
    assert_eq!(plte.len() / 3, 4); // 3 break colors + transparent
    assert_eq!(trns[3], 0);

    // Every pixel uses the transparent palette slot.
    let indices = decode_indices(&png, 4, 4);
    assert!(indices.iter().all(|&i| i == 3));
}

#[test]
fn test_split_raster_colors_left_half_masks_right_half() {
    // Left half holds value 5, right half NoData.
    let mut cells = split_cells(8, 8, 5, 0);
    for cell in cells.iter_mut() {
        if *cell == 0 {
            *cell = NODATA;
        }
    }
    let r = raster(cells, 8, 8);

    let colors = vec![Color::opaque(10, 20, 30)];
    let png = render_png_with_colors(&r, &[5], &colors).unwrap();

    let indices = decode_indices(&png, 8, 8);
    for row in indices.chunks_exact(8) {
        assert!(row[..4].iter().all(|&i| i == 0), "left half colored");
        assert!(row[4..].iter().all(|&i| i == 1), "right half transparent");
    }

    let parsed = chunks(&png);
    let plte = chunk(&parsed, "PLTE").unwrap();
    assert_eq!(&plte[0..3], &[10, 20, 30]);
}

#[test]
fn test_values_bucket_to_smallest_break_at_or_above() {
    let r = raster(vec![1, 10, 11, 99], 2, 2);
    let colors = vec![
        Color::opaque(1, 0, 0),
        Color::opaque(2, 0, 0),
    ];
    let png = render_png_with_colors(&r, &[10, 20], &colors).unwrap();

    let indices = decode_indices(&png, 2, 2);
    assert_eq!(indices, vec![0, 0, 1, 1]);
}

#[test]
fn test_color_break_count_mismatch_is_an_error() {
    let r = raster(vec![1; 4], 2, 2);
    let colors = vec![Color::opaque(0, 0, 0)];
    assert!(render_png_with_colors(&r, &[1, 2], &colors).is_err());
    assert!(render_png_with_colors(&r, &[], &[]).is_err());
}
