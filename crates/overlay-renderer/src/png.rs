//! PNG encoding for rendered rasters.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: the normal path. Break palettes are
//!   known ahead of rendering and are far smaller than 256 entries, so
//!   tiles encode as 1 byte per pixel with a tRNS transparency chunk.
//! - **RGBA PNG (color type 6)**: fallback for palettes that do not fit
//!   an indexed encoding.

use std::io::Write;

use crate::ramp::Color;

/// Maximum entries for an indexed palette (PNG8).
pub const MAX_PALETTE_SIZE: usize = 256;

/// Create an indexed PNG (color type 3) from a palette and per-pixel
/// palette indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[Color],
    indices: &[u8],
) -> Result<Vec<u8>, String> {
    if palette.len() > MAX_PALETTE_SIZE {
        return Err(format!("palette has {} entries, max is {}", palette.len(), MAX_PALETTE_SIZE));
    }
    if indices.len() != width * height {
        return Err(format!(
            "expected {}x{}={} indices, got {}",
            width,
            height,
            width * height,
            indices.len()
        ));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth (8 bits per palette index)
    ihdr_data.push(3); // color type 3 = indexed
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // PLTE chunk (palette)
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for color in palette {
        plte_data.push(color.r);
        plte_data.push(color.g);
        plte_data.push(color.b);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS chunk (transparency) - only if any color has alpha < 255
    let has_transparency = palette.iter().any(|c| c.a < 255);
    if has_transparency {
        let trns_data: Vec<u8> = palette.iter().map(|c| c.a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    // IDAT chunk (image data)
    let idat_data = deflate_idat_indexed(indices, width, height)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    if pixels.len() != width * height * 4 {
        return Err(format!(
            "expected {}x{}x4={} bytes, got {}",
            width,
            height,
            width * height * 4,
            pixels.len()
        ));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::new();
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat_rgba(pixels, width, height)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc_data = [chunk_type.as_slice(), data].concat();
    let crc = crc32fast::hash(&crc_data);
    png.extend_from_slice(&crc.to_be_bytes());
}

/// Deflate indexed image data for the IDAT chunk.
fn deflate_idat_indexed(
    indices: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    // Each scanline is a filter byte (0 = none) plus width index bytes.
    let mut uncompressed = Vec::with_capacity(height * (1 + width));
    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * width;
        uncompressed.extend_from_slice(&indices[row_start..row_start + width]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    Ok(encoder.finish()?)
}

/// Deflate RGBA image data for the IDAT chunk.
fn deflate_idat_rgba(
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + width * 4));
    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * width * 4;
        uncompressed.extend_from_slice(&pixels[row_start..row_start + width * 4]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    fn chunk_types(png: &[u8]) -> Vec<String> {
        let mut types = Vec::new();
        let mut offset = 8;
        while offset + 8 <= png.len() {
            let len = u32::from_be_bytes(png[offset..offset + 4].try_into().unwrap()) as usize;
            types.push(String::from_utf8_lossy(&png[offset + 4..offset + 8]).into_owned());
            offset += 12 + len;
        }
        types
    }

    #[test]
    fn test_indexed_png_structure() {
        let palette = [Color::opaque(255, 0, 0), Color::opaque(0, 255, 0)];
        let indices = [0u8, 1, 1, 0];

        let png = create_png_indexed(2, 2, &palette, &indices).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(chunk_types(&png), vec!["IHDR", "PLTE", "IDAT", "IEND"]);
    }

    #[test]
    fn test_indexed_png_with_transparency_has_trns() {
        let palette = [Color::opaque(255, 0, 0), Color::transparent()];
        let indices = [0u8, 1, 1, 0];

        let png = create_png_indexed(2, 2, &palette, &indices).unwrap();
        assert_eq!(chunk_types(&png), vec!["IHDR", "PLTE", "tRNS", "IDAT", "IEND"]);
    }

    #[test]
    fn test_indexed_png_rejects_oversized_palette() {
        let palette = vec![Color::opaque(0, 0, 0); 257];
        let indices = vec![0u8; 4];
        assert!(create_png_indexed(2, 2, &palette, &indices).is_err());
    }

    #[test]
    fn test_indexed_png_rejects_wrong_index_count() {
        let palette = [Color::opaque(0, 0, 0)];
        assert!(create_png_indexed(2, 2, &palette, &[0u8; 3]).is_err());
    }

    #[test]
    fn test_rgba_png_structure() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            0, 0, 0, 0, //     transparent
        ];

        let png = create_png(&pixels, 2, 2).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(chunk_types(&png), vec!["IHDR", "IDAT", "IEND"]);
        // Color type 6 (RGBA) in the IHDR.
        assert_eq!(png[8 + 8 + 9], 6);
    }

    #[test]
    fn test_rgba_png_rejects_short_buffer() {
        assert!(create_png(&[0u8; 15], 2, 2).is_err());
    }
}
