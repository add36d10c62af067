//! Display geometry for live preview
//!
//! Camera frames come in landscape. For a portrait surface the image is
//! rotated 90 degrees clockwise and scaled so its rotated height fills the
//! surface height. This only moves pixels around; labels are untouched.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Pixel};

use crate::error::{PipelineError, Result};
use crate::models::BinaryImage;

/// Rotate clockwise by 90 degrees and scale to `target_height` rows
pub fn orient_for_display<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    target_height: u32,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || target_height == 0 {
        return Err(PipelineError::InvalidParameter(format!(
            "cannot orient {}x{} image for a surface {} pixels high",
            width, height, target_height
        )));
    }

    let rotated = imageops::rotate90(image);
    // Rotated height is the source width
    let scale = target_height as f64 / width as f64;
    let new_width = ((height as f64 * scale).round() as u32).max(1);
    if new_width == height && target_height == width {
        return Ok(rotated);
    }
    Ok(imageops::resize(&rotated, new_width, target_height, FilterType::Nearest))
}

/// Binary frame rendered and oriented for a portrait surface
pub fn binary_preview(binary: &BinaryImage, target_height: u32) -> Result<GrayImage> {
    orient_for_display(&binary.to_luma_image(), target_height)
}
