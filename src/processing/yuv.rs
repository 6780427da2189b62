//! YUV420SP (NV21) frame conversion.
//!
//! Camera preview buffers arrive as a full-resolution luma plane followed by
//! an interleaved V/U plane at half resolution. Pixels are produced as ARGB
//! words (`0xAARRGGBB`).

use image::RgbImage;

/// Number of luma samples in a frame, or None if it does not fit in `usize`.
pub fn luma_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)
}

/// Number of bytes in an NV21 frame, or None if it does not fit in `usize`.
pub fn nv21_len(width: u32, height: u32) -> Option<usize> {
    let (w, h) = (width as usize, height as usize);
    let chroma = h.div_ceil(2).checked_mul(w.div_ceil(2))?.checked_mul(2)?;
    luma_len(width, height)?.checked_add(chroma)
}

/// Convert a luma sample to an opaque gray ARGB pixel.
#[inline]
fn luma_to_argb(sample: u8) -> u32 {
    let value = (i32::from(sample) - 16).clamp(0, 255) as u32;
    0xFF00_0000 | (value << 16) | (value << 8) | value
}

/// Decode the luma plane of an NV21 frame into grayscale ARGB pixels.
///
/// Only the first `width * height` bytes are read. A shorter buffer yields
/// fewer pixels.
pub fn decode_yuv420sp_grayscale(yuv420sp: &[u8], width: u32, height: u32) -> Vec<u32> {
    let frame_size = luma_len(width, height).unwrap_or(usize::MAX);
    yuv420sp
        .iter()
        .take(frame_size)
        .map(|&sample| luma_to_argb(sample))
        .collect()
}

/// Decode an NV21 frame into color ARGB pixels.
///
/// Uses the fixed-point BT.601 coefficients (scaled by 1024). The buffer must
/// hold at least [`nv21_len`] bytes; missing chroma samples are read as
/// neutral gray. Dimensions too large to address yield no pixels.
pub fn decode_yuv420sp_rgb(yuv420sp: &[u8], width: u32, height: u32) -> Vec<u32> {
    let (w, h) = (width as usize, height as usize);
    if nv21_len(width, height).is_none() {
        return Vec::new();
    }
    let frame_size = w * h;
    let sample = |index: usize, neutral: u8| i32::from(*yuv420sp.get(index).unwrap_or(&neutral));

    let mut argb = Vec::with_capacity(frame_size);
    for row in 0..h {
        let mut uv_index = frame_size + (row >> 1) * w.div_ceil(2) * 2;
        let (mut u, mut v) = (0, 0);

        for col in 0..w {
            let y = (sample(row * w + col, 16) - 16).max(0);
            if col & 1 == 0 {
                v = sample(uv_index, 128) - 128;
                u = sample(uv_index + 1, 128) - 128;
                uv_index += 2;
            }

            let y1192 = 1192 * y;
            let r = (y1192 + 1634 * v).clamp(0, 262_143);
            let g = (y1192 - 833 * v - 400 * u).clamp(0, 262_143);
            let b = (y1192 + 2066 * u).clamp(0, 262_143);

            argb.push(
                0xFF00_0000
                    | (((r << 6) & 0x00FF_0000) as u32)
                    | (((g >> 2) & 0x0000_FF00) as u32)
                    | (((b >> 10) & 0x0000_00FF) as u32),
            );
        }
    }
    argb
}

/// Pack ARGB pixels into an RGB image, dropping alpha.
///
/// Returns None when the pixel count does not match the dimensions.
pub fn argb_to_rgb_image(argb: &[u32], width: u32, height: u32) -> Option<RgbImage> {
    if luma_len(width, height) != Some(argb.len()) {
        return None;
    }
    let raw = argb
        .iter()
        .flat_map(|&pixel| [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8])
        .collect();
    RgbImage::from_raw(width, height, raw)
}
