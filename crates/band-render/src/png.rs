//! PNG encoding for RGBA image data.
//!
//! Two encoding modes:
//! - **Indexed PNG (color type 3)** when the image has ≤256 unique colors.
//!   Smaller files, faster deflate.
//! - **RGBA PNG (color type 6)** as the fallback for richer images.
//!
//! `encode_auto` picks the mode from the pixel data; both paths are
//! deterministic, so encoding the same pixels always yields the same bytes.

use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};

/// Maximum palette entries for an indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixel count before palette extraction goes parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Encode RGBA pixels as PNG, choosing indexed or RGBA encoding based on
/// the number of unique colors.
pub fn encode_auto(
    pixels: &[u8],
    width: usize,
    height: usize,
    compression: flate2::Compression,
) -> RenderResult<Vec<u8>> {
    let num_pixels = pixels.len() / 4;

    let extracted = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match extracted {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices, compression),
        None => encode_rgba(pixels, width, height, compression),
    }
}

/// Encode RGBA pixels as a color type 6 (truecolor + alpha) PNG.
pub fn encode_rgba(
    pixels: &[u8],
    width: usize,
    height: usize,
    compression: flate2::Compression,
) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type: RGBA
    ihdr.extend_from_slice(&[0, 0, 0]); // compression, filter, interlace
    write_chunk(&mut png, b"IHDR", &ihdr);

    let idat = deflate_scanlines(pixels, width * 4, height, compression)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode a palette plus per-pixel indices as a color type 3 (indexed) PNG.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
    compression: flate2::Compression,
) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth: 8 bits per palette index
    ihdr.push(3); // color type: indexed
    ihdr.extend_from_slice(&[0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for &(r, g, b, _) in palette {
        plte.extend_from_slice(&[r, g, b]);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is non-opaque
    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height, compression)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Pack RGBA bytes into a u32 for fast hashing and comparison.
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    (
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    )
}

/// Palette extraction for small images: one pass, first-seen color order.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = pack_color(px[0], px[1], px[2], px[3]);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((px[0], px[1], px[2], px[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Palette extraction for larger images.
///
/// Unique colors are collected per chunk in parallel, merged in chunk order
/// (so the palette order is stable across runs), then a second parallel
/// pass maps every pixel to its palette index.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let chunk_size = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;

    let per_chunk_colors: Vec<Vec<u32>> = pixels
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            let mut in_order = Vec::new();
            for px in chunk.chunks_exact(4) {
                let packed = pack_color(px[0], px[1], px[2], px[3]);
                if seen.insert(packed, ()).is_none() {
                    in_order.push(packed);
                    if in_order.len() > MAX_PALETTE_SIZE {
                        break;
                    }
                }
            }
            in_order
        })
        .collect();

    let mut global: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in per_chunk_colors.into_iter().flatten() {
        if !global.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            let idx = palette.len() as u8;
            global.insert(packed, idx);
            palette.push(unpack_color(packed));
        }
    }

    let indices: Vec<u8> = pixels
        .par_chunks(4)
        .map(|px| {
            let packed = pack_color(px[0], px[1], px[2], px[3]);
            *global.get(&packed).unwrap_or(&0)
        })
        .collect();

    Some((palette, indices))
}

/// Prefix each scanline with a filter byte (0 = none) and zlib-compress.
fn deflate_scanlines(
    data: &[u8],
    row_bytes: usize,
    height: usize,
    compression: flate2::Compression,
) -> RenderResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (1 + row_bytes));
    for y in 0..height {
        raw.push(0);
        raw.extend_from_slice(&data[y * row_bytes..(y + 1) * row_bytes]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), compression);
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

/// Write one PNG chunk: length, type, data, CRC.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> flate2::Compression {
        flate2::Compression::fast()
    }

    #[test]
    fn test_extract_palette_simple() {
        // red, green, blue, red again: 3 unique colors
        let pixels = [
            255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 0, 0, 255,
        ];
        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices.len(), 4);
        assert_eq!(indices[0], indices[3]);
    }

    #[test]
    fn test_extract_palette_transparency() {
        let pixels = [255, 0, 0, 255, 0, 0, 0, 0];
        let (palette, _) = extract_palette_sequential(&pixels).unwrap();
        assert!(palette.iter().any(|&(_, _, _, a)| a == 0));
        assert!(palette.iter().any(|&(_, _, _, a)| a == 255));
    }

    #[test]
    fn test_extract_palette_parallel_matches_sequential() {
        // 128x128 with ~50 unique colors, above PARALLEL_THRESHOLD
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let idx = ((x / 8) + (y / 8)) % 50;
                pixels.extend_from_slice(&[
                    (idx * 5) as u8,
                    (100 + idx * 3) as u8,
                    (200 - idx * 2) as u8,
                    255,
                ]);
            }
        }

        let (seq_palette, seq_indices) = extract_palette_sequential(&pixels).unwrap();
        let (par_palette, par_indices) = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(par_palette, seq_palette);
        assert_eq!(par_indices, seq_indices);
    }

    #[test]
    fn test_encode_auto_signature() {
        let pixels = [
            255, 0, 0, 255, 0, 255, 0, 255, 0, 255, 0, 255, 255, 0, 0, 255,
        ];
        let png = encode_auto(&pixels, 2, 2, fast()).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        // IHDR follows immediately
        assert_eq!(&png[12..16], b"IHDR");
    }

    #[test]
    fn test_encode_auto_rgba_fallback() {
        // >256 unique colors forces truecolor encoding
        let mut pixels = Vec::with_capacity(300 * 4);
        for i in 0..300usize {
            pixels.extend_from_slice(&[
                (i % 256) as u8,
                ((i / 2) % 256) as u8,
                ((i / 3) % 256) as u8,
                255,
            ]);
        }
        let auto = encode_auto(&pixels, 300, 1, fast()).unwrap();
        let rgba = encode_rgba(&pixels, 300, 1, fast()).unwrap();
        assert_eq!(auto, rgba);
    }

    #[test]
    fn test_encode_deterministic() {
        let mut pixels = Vec::with_capacity(96 * 96 * 4);
        for y in 0..96u32 {
            for x in 0..96u32 {
                let v = (((x + y) % 16) * 16) as u8;
                pixels.extend_from_slice(&[v, 128, 255 - v, 255]);
            }
        }
        let a = encode_auto(&pixels, 96, 96, fast()).unwrap();
        let b = encode_auto(&pixels, 96, 96, fast()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_indexed_smaller_than_rgba_for_flat_colors() {
        let mut pixels = Vec::with_capacity(64 * 64 * 4);
        for i in 0..64 * 64usize {
            let v = ((i / 512) * 32) as u8;
            pixels.extend_from_slice(&[v, v, 0, 255]);
        }
        let auto = encode_auto(&pixels, 64, 64, fast()).unwrap();
        let rgba = encode_rgba(&pixels, 64, 64, fast()).unwrap();
        assert!(auto.len() < rgba.len());
    }
}
