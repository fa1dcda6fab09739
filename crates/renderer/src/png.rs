//! PNG encoding for chart frames.
//!
//! Two modes:
//! - **Indexed (color type 3)** when the frame fits a 256-color palette -
//!   discrete shading usually does, and the files are much smaller.
//! - **RGBA (color type 6)** fallback for frames with more colors.

use std::collections::HashMap;
use std::io::Write;

use chart_common::{ChartError, ChartResult};

/// Maximum palette size for indexed encoding.
const MAX_PALETTE_SIZE: usize = 256;

/// Encode with automatic mode selection.
pub fn encode_auto(
    pixels: &[u8],
    width: usize,
    height: usize,
    compression: u32,
) -> ChartResult<Vec<u8>> {
    match extract_palette(pixels) {
        Some((palette, indices)) => {
            tracing::trace!(colors = palette.len(), "encoding indexed png");
            encode_indexed(width, height, &palette, &indices, compression)
        }
        None => {
            tracing::trace!("palette overflow, encoding rgba png");
            encode_rgba(pixels, width, height, compression)
        }
    }
}

#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Try to express the image as palette + per-pixel indices.
/// Returns None when the image has more than 256 distinct colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::new();
    let mut palette: Vec<[u8; 4]> = Vec::new();
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let key = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Encode an indexed PNG (color type 3) with PLTE and tRNS chunks.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
    compression: u32,
) -> ChartResult<Vec<u8>> {
    if indices.len() != width * height {
        return Err(ChartError::RenderError(format!(
            "index buffer size {} does not match {}x{}",
            indices.len(),
            width,
            height
        )));
    }

    let mut png = png_signature();
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let mut plte = Vec::with_capacity(palette.len() * 3);
    let mut trns = Vec::with_capacity(palette.len());
    for color in palette {
        plte.extend_from_slice(&color[..3]);
        trns.push(color[3]);
    }
    write_chunk(&mut png, b"PLTE", &plte);
    write_chunk(&mut png, b"tRNS", &trns);

    let mut raw = Vec::with_capacity((width + 1) * height);
    for row in indices.chunks_exact(width) {
        raw.push(0); // filter type: none
        raw.extend_from_slice(row);
    }
    write_chunk(&mut png, b"IDAT", &deflate(&raw, compression)?);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode an RGBA PNG (color type 6).
pub fn encode_rgba(
    pixels: &[u8],
    width: usize,
    height: usize,
    compression: u32,
) -> ChartResult<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(ChartError::RenderError(format!(
            "pixel buffer size {} does not match {}x{}",
            pixels.len(),
            width,
            height
        )));
    }

    let mut png = png_signature();
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let mut raw = Vec::with_capacity((width * 4 + 1) * height);
    for row in pixels.chunks_exact(width * 4) {
        raw.push(0); // filter type: none
        raw.extend_from_slice(row);
    }
    write_chunk(&mut png, b"IDAT", &deflate(&raw, compression)?);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn png_signature() -> Vec<u8> {
    vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(color_type);
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    ihdr
}

fn deflate(raw: &[u8], compression: u32) -> ChartResult<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(
        Vec::new(),
        flate2::Compression::new(compression.min(9)),
    );
    encoder
        .write_all(raw)
        .map_err(|e| ChartError::RenderError(format!("deflate: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ChartError::RenderError(format!("deflate: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
