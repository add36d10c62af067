//! Convert RGB image to luminance
//! Y = 0.299*R + 0.587*G + 0.114*B, rounded to nearest
//! Uses fixed-point arithmetic: Y = (19595*R + 38470*G + 7471*B + 32768) >> 16
//!
//! The coefficients sum to 65536, so a gray input maps to itself and
//! white stays 255.

use rayon::prelude::*;

use crate::error::{PipelineError, Result};
use crate::models::frame::plane_len;

/// Coefficients for luma conversion, 16 fractional bits
const COEF_R: u32 = 19595;
const COEF_G: u32 = 38470;
const COEF_B: u32 = 7471;
const ROUND: u32 = 1 << 15;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + ROUND) >> 16) as u8
}

fn check_dimensions(rgb: &[u8], width: usize, height: usize) -> Result<usize> {
    let pixel_count = plane_len(width, height)?;
    if width == 0 || height == 0 || Some(rgb.len()) != pixel_count.checked_mul(3) {
        return Err(PipelineError::buffer_size("RGB", width, height, rgb.len()));
    }
    Ok(pixel_count)
}

/// Convert RGB image to luminance
pub fn rgb_to_luma(rgb: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let pixel_count = check_dimensions(rgb, width, height)?;
    let mut gray = vec![0u8; pixel_count];
    rgb_to_luma_scalar_unrolled(rgb, &mut gray);
    Ok(gray)
}

/// Convert RGB to luminance using a pre-allocated buffer (no allocation)
///
/// # Arguments
/// * `rgb` - Input RGB image data
/// * `width` - Image width
/// * `height` - Image height
/// * `output` - Output buffer, must hold exactly `width * height` bytes
///
/// # Returns
/// Number of pixels written (width * height)
pub fn rgb_to_luma_into(
    rgb: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> Result<usize> {
    let pixel_count = check_dimensions(rgb, width, height)?;
    if output.len() != pixel_count {
        return Err(PipelineError::buffer_size("luma", width, height, output.len()));
    }
    rgb_to_luma_scalar_unrolled(rgb, output);
    Ok(pixel_count)
}

// ============== Scalar Implementation ==============

fn rgb_to_luma_scalar_unrolled(rgb: &[u8], gray: &mut [u8]) {
    let mut src = rgb.chunks_exact(24);
    let mut dst = gray.chunks_exact_mut(8);

    // Process 8 pixels at a time
    for (input, output) in (&mut src).zip(&mut dst) {
        for j in 0..8 {
            let idx = j * 3;
            output[j] = luma(input[idx], input[idx + 1], input[idx + 2]);
        }
    }

    // Process remaining pixels
    for (px, out) in src
        .remainder()
        .chunks_exact(3)
        .zip(dst.into_remainder().iter_mut())
    {
        *out = luma(px[0], px[1], px[2]);
    }
}

// ============== Parallel Processing with Rayon ==============

/// Convert RGB to luminance using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgb_to_luma_parallel(rgb: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let pixel_count = check_dimensions(rgb, width, height)?;
    let mut gray = vec![0u8; pixel_count];

    gray.par_chunks_mut(width)
        .zip(rgb.par_chunks(width * 3))
        .for_each(|(row, src)| {
            for (out, px) in row.iter_mut().zip(src.chunks_exact(3)) {
                *out = luma(px[0], px[1], px[2]);
            }
        });

    Ok(gray)
}
