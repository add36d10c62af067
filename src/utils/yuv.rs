//! Frame decoding: planar YUV sensor frames to interleaved RGB
//!
//! Camera frames arrive as {Y, U, V} planes. They are re-encoded as a
//! single planar buffer in {Y, V, U} order (chroma planes swapped), which
//! is the layout `planar_to_rgb` consumes. Reading the chroma planes back
//! in the wrong order swaps Cb and Cr and tints the whole image.

use image::RgbImage;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::frame::plane_len;
use crate::models::{ChromaSubsampling, RawFrame};

/// Re-encode a frame as Y plane, then V plane, then U plane
pub fn reorder_planes(frame: &RawFrame) -> Result<Vec<u8>> {
    let y = frame.y_plane();
    let u = frame.u_plane();
    let v = frame.v_plane();

    let expected = frame.luma_len() + 2 * frame.chroma_len();
    if y.len() + u.len() + v.len() != expected {
        return Err(PipelineError::InvalidFrame(format!(
            "planes hold {} bytes, expected {} for {}x{}",
            y.len() + u.len() + v.len(),
            expected,
            frame.width(),
            frame.height()
        )));
    }

    let mut data = Vec::with_capacity(expected);
    data.extend_from_slice(y);
    data.extend_from_slice(v);
    data.extend_from_slice(u);
    Ok(data)
}

/// Transcode a {Y, V, U} planar buffer into interleaved RGB.
///
/// BT.601 full range (JFIF) coefficients, nearest-sample chroma upsampling.
pub fn planar_to_rgb(
    data: &[u8],
    width: usize,
    height: usize,
    subsampling: ChromaSubsampling,
) -> Result<RgbImage> {
    if width == 0 || height == 0 || subsampling.horizontal == 0 || subsampling.vertical == 0 {
        return Err(PipelineError::InvalidFrame(format!(
            "cannot transcode {}x{} frame with {}x{} subsampling",
            width, height, subsampling.horizontal, subsampling.vertical
        )));
    }

    let luma_len = plane_len(width, height)?;
    let (cw, ch) = subsampling.chroma_dimensions(width, height);
    let chroma_len = plane_len(cw, ch)?;
    let expected = chroma_len
        .checked_mul(2)
        .and_then(|c| c.checked_add(luma_len));
    if expected != Some(data.len()) {
        return Err(PipelineError::buffer_size("planar", width, height, data.len()));
    }
    let rgb_len = plane_len(luma_len, 3)?;

    let (y_plane, chroma) = data.split_at(luma_len);
    let (v_plane, u_plane) = chroma.split_at(chroma_len);

    let mut rgb = vec![0u8; rgb_len];
    for (row, out) in rgb.chunks_exact_mut(width * 3).enumerate() {
        let y_row = &y_plane[row * width..(row + 1) * width];
        let c_row = (row / subsampling.vertical) * cw;
        for (col, px) in out.chunks_exact_mut(3).enumerate() {
            let c = c_row + col / subsampling.horizontal;
            let [r, g, b] = ycbcr_to_rgb(y_row[col], u_plane[c], v_plane[c]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }

    RgbImage::from_raw(width as u32, height as u32, rgb)
        .ok_or_else(|| PipelineError::buffer_size("RGB", width, height, rgb_len))
}

/// Decode a raw sensor frame into an interleaved color image
pub fn decode_frame(frame: &RawFrame) -> Result<RgbImage> {
    let planar = reorder_planes(frame)?;
    debug!(
        width = frame.width(),
        height = frame.height(),
        bytes = planar.len(),
        "re-encoded frame planes"
    );
    planar_to_rgb(&planar, frame.width(), frame.height(), frame.subsampling())
}

// 16 fractional bits: 1.402, 0.344136, 0.714136, 1.772
const CR_TO_R: i32 = 91881;
const CB_TO_G: i32 = 22554;
const CR_TO_G: i32 = 46802;
const CB_TO_B: i32 = 116130;

#[inline]
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = (y as i32) << 16;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;
    let round = 1 << 15;
    let r = (y + CR_TO_R * cr + round) >> 16;
    let g = (y - CB_TO_G * cb - CR_TO_G * cr + round) >> 16;
    let b = (y + CB_TO_B * cb + round) >> 16;
    [clamp_u8(r), clamp_u8(g), clamp_u8(b)]
}

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}
