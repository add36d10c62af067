//! Binarization of intensity images
//!
//! `bradley_binarize` is the Bradley-Roth local mean threshold: a pixel is
//! foreground when it is darker than the mean of its surrounding window
//! by more than `sensitivity`. Window sums come from an [`IntegralImage`],
//! which must be fully built before any pixel is classified.

use rayon::prelude::*;
use tracing::trace;

use crate::error::{PipelineError, Result};
use crate::models::BinaryImage;
use crate::models::binary::pack_row;
use crate::models::frame::plane_len;
use crate::utils::integral::IntegralImage;

/// Default sensitivity: a pixel must be 15% darker than its local mean
pub const DEFAULT_SENSITIVITY: f64 = 0.15;

/// Default window side as a fraction of the image width (1/8)
pub const DEFAULT_WINDOW_DIVISOR: usize = 8;

/// Validated parameters for the local mean threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdParams {
    window_side: usize,
    sensitivity: f64,
}

impl ThresholdParams {
    /// `window_side` must be positive and `sensitivity` in `[0, 1)`
    pub fn new(window_side: usize, sensitivity: f64) -> Result<Self> {
        if window_side == 0 {
            return Err(PipelineError::InvalidParameter(
                "window side must be greater than 0".to_string(),
            ));
        }
        if !sensitivity.is_finite() || !(0.0..1.0).contains(&sensitivity) {
            return Err(PipelineError::InvalidParameter(format!(
                "sensitivity {} is outside [0, 1)",
                sensitivity
            )));
        }
        Ok(Self {
            window_side,
            sensitivity,
        })
    }

    /// Defaults for an image of the given width: side `width / 8` (at least 1),
    /// sensitivity 0.15
    pub fn for_width(width: usize) -> Self {
        Self {
            window_side: default_window_side(width),
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }

    /// Side of the square averaging window
    pub fn window_side(&self) -> usize {
        self.window_side
    }

    /// Fraction below the local mean a pixel must fall to be foreground
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Half-width of the window around the center pixel
    pub fn radius(&self) -> usize {
        self.window_side / 2
    }
}

/// Default window side for an image width
pub fn default_window_side(width: usize) -> usize {
    (width / DEFAULT_WINDOW_DIVISOR).max(1)
}

/// Bradley-Roth adaptive binarization. Returns a BinaryImage where true = foreground
pub fn bradley_binarize(
    gray: &[u8],
    width: usize,
    height: usize,
    params: &ThresholdParams,
) -> Result<BinaryImage> {
    let mut integral = IntegralImage::default();
    let mut binary = BinaryImage::default();
    bradley_binarize_into(gray, width, height, params, &mut binary, &mut integral)?;
    Ok(binary)
}

/// Bradley-Roth binarization into caller-provided buffers
///
/// `output` is reset to `width` x `height`; `integral` is scratch space
/// reused between frames.
pub fn bradley_binarize_into(
    gray: &[u8],
    width: usize,
    height: usize,
    params: &ThresholdParams,
    output: &mut BinaryImage,
    integral: &mut IntegralImage,
) -> Result<()> {
    // Pass 1: summed-area table over the whole image
    integral.rebuild(gray, width, height)?;

    // Pass 2: classify rows independently
    let radius = params.radius();
    let scale = 1.0 - params.sensitivity();
    output.reset(width, height);
    output.par_rows_mut().enumerate().for_each(|(y, row)| {
        let src = &gray[y * width..(y + 1) * width];
        pack_row(
            row,
            src.iter().enumerate().map(|(x, &value)| {
                let (sum, count) = integral.window(x, y, radius);
                is_foreground(value, sum, count, scale)
            }),
        );
    });

    trace!(
        width,
        height,
        radius,
        foreground = output.count_foreground(),
        "bradley threshold applied"
    );
    Ok(())
}

/// `value < (sum / count) * scale`, without the division
#[inline]
fn is_foreground(value: u8, sum: u64, count: u64, scale: f64) -> bool {
    (value as f64) * (count as f64) < (sum as f64) * scale
}

/// Simple global threshold binarization
pub fn global_threshold_binarize(
    gray: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
) -> Result<BinaryImage> {
    if width == 0 || height == 0 || gray.len() != plane_len(width, height)? {
        return Err(PipelineError::buffer_size("intensity", width, height, gray.len()));
    }

    let mut binary = BinaryImage::new(width, height);
    binary
        .par_rows_mut()
        .zip(gray.par_chunks(width))
        .for_each(|(row, src)| pack_row(row, src.iter().map(|&v| v < threshold)));

    Ok(binary)
}
