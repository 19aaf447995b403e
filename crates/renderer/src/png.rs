//! PNG encoding for RGBA image data.
//!
//! Two color types are written:
//! - **Indexed (color type 3)** when the image has at most 256 distinct
//!   RGBA values. Flat map colors usually fit.
//! - **Truecolor with alpha (color type 6)** otherwise, which is the common
//!   case once anti-aliased edges and glyphs are on the canvas.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::RenderError;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest palette an 8-bit indexed PNG can carry
const MAX_PALETTE_SIZE: usize = 256;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Encode straight-alpha RGBA pixels, choosing indexed output when it fits.
pub fn encode(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width, height, 4)?;

    match build_palette(pixels) {
        Some(palette) => encode_indexed(width, height, &palette.colors, &palette.indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Palette and per-pixel indices of an image with few colors.
#[derive(Debug)]
struct Palette {
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

/// Collect distinct colors in first-seen order. `None` past 256 colors.
fn build_palette(pixels: &[u8]) -> Option<Palette> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = [px[0], px[1], px[2], px[3]];
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if colors.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = colors.len() as u8;
                colors.push(key);
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some(Palette { colors, indices })
}

/// Write an indexed PNG. A tRNS chunk is added only if some entry is not opaque.
pub fn encode_indexed(
    width: u32,
    height: u32,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>, RenderError> {
    check_len(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encode(format!(
            "palette has {} entries",
            palette.len()
        )));
    }

    let mut png = Vec::with_capacity(indices.len() / 4 + 1024);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = compress_scanlines(indices, width as usize, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write an 8-bit RGBA PNG.
pub fn encode_rgba(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width, height, 4)?;

    let mut png = Vec::with_capacity(pixels.len() / 8 + 1024);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, COLOR_TYPE_RGBA));

    let idat = compress_scanlines(pixels, width as usize * 4, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_len(len: usize, width: u32, height: u32, bytes_per_pixel: usize) -> Result<(), RenderError> {
    let expected = width as usize * height as usize * bytes_per_pixel;
    if width == 0 || height == 0 || len != expected {
        return Err(RenderError::Encode(format!(
            "{} bytes do not match a {}x{} image",
            len, width, height
        )));
    }
    Ok(())
}

/// IHDR payload: 8-bit depth, deflate, no filter method, no interlace.
fn header(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = 8;
    ihdr[9] = color_type;
    ihdr
}

/// Prefix every row with filter type 0 and zlib-compress the result.
fn compress_scanlines(data: &[u8], row_bytes: usize, rows: usize) -> Result<Vec<u8>, RenderError> {
    let mut raw = Vec::with_capacity(rows * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes).take(rows) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

/// Append a chunk: length, type, payload, CRC over type and payload.
fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    png.extend_from_slice(&crc.finalize().to_be_bytes());
}
