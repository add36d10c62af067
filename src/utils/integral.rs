//! Summed-area table over an 8-bit intensity image
//!
//! Stored as a `(width + 1) x (height + 1)` table with a zero top row and
//! left column, so entry `(x + 1, y + 1)` holds the sum of every sample
//! at or above-left of `(x, y)`. Sums are `u64`: a full frame of 255s
//! overflows `u32` past roughly 16.8 megapixels.

use rayon::prelude::*;

use crate::error::{PipelineError, Result};
use crate::models::frame::plane_len;

/// Summed-area table with O(1) rectangle sums
#[derive(Debug, Clone, Default)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    table: Vec<u64>,
}

impl IntegralImage {
    /// Build the table in one pass over `gray`
    pub fn build(gray: &[u8], width: usize, height: usize) -> Result<Self> {
        let mut integral = Self::default();
        integral.rebuild(gray, width, height)?;
        Ok(integral)
    }

    /// Rebuild in place, reusing the table allocation
    pub fn rebuild(&mut self, gray: &[u8], width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 || gray.len() != plane_len(width, height)? {
            return Err(PipelineError::buffer_size("intensity", width, height, gray.len()));
        }

        let stride = width + 1;
        let table_len = plane_len(stride, height + 1)?;
        if table_len.checked_mul(size_of::<u64>()).is_none_or(|b| b > isize::MAX as usize) {
            return Err(PipelineError::buffer_size("integral", width, height, gray.len()));
        }
        self.width = width;
        self.height = height;
        self.table.clear();
        self.table.resize(table_len, 0);

        // Row prefix sums are independent of each other
        self.table[stride..]
            .par_chunks_mut(stride)
            .zip(gray.par_chunks(width))
            .for_each(|(row, src)| {
                let mut acc = 0u64;
                for (cell, &v) in row[1..].iter_mut().zip(src) {
                    acc += v as u64;
                    *cell = acc;
                }
            });

        // Column merge carries a top-to-bottom dependency
        for y in 2..=height {
            let (above, current) = self.table.split_at_mut(y * stride);
            let prev = &above[(y - 1) * stride..];
            for (cell, &up) in current[..stride].iter_mut().zip(prev) {
                *cell += up;
            }
        }

        Ok(())
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> u64 {
        self.table[y * (self.width + 1) + x]
    }

    /// Sum over the inclusive rectangle `[x0, x1] x [y0, y1]`
    ///
    /// Coordinates must satisfy `x0 <= x1 < width` and `y0 <= y1 < height`.
    #[inline]
    pub fn window_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        debug_assert!(x0 <= x1 && x1 < self.width);
        debug_assert!(y0 <= y1 && y1 < self.height);
        self.at(x1 + 1, y1 + 1) + self.at(x0, y0) - self.at(x0, y1 + 1) - self.at(x1 + 1, y0)
    }

    /// Sum and pixel count of the square window of `radius` around `(x, y)`,
    /// truncated at the image borders
    #[inline]
    pub fn window(&self, x: usize, y: usize, radius: usize) -> (u64, u64) {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(self.width - 1);
        let y1 = (y + radius).min(self.height - 1);
        let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
        (self.window_sum(x0, y0, x1, y1), count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(gray: &[u8], width: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let mut sum = 0u64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                sum += gray[y * width + x] as u64;
            }
        }
        sum
    }

    fn pseudo_random_image(width: usize, height: usize) -> Vec<u8> {
        let mut state = 0x2545_f491u32;
        (0..width * height)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_every_rectangle_matches_brute_force() {
        let (w, h) = (9, 6);
        let gray = pseudo_random_image(w, h);
        let integral = IntegralImage::build(&gray, w, h).unwrap();
        for y0 in 0..h {
            for y1 in y0..h {
                for x0 in 0..w {
                    for x1 in x0..w {
                        assert_eq!(
                            integral.window_sum(x0, y0, x1, y1),
                            brute_force(&gray, w, x0, y0, x1, y1)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_windows_truncate_at_borders() {
        let (w, h) = (7, 5);
        let gray = pseudo_random_image(w, h);
        let integral = IntegralImage::build(&gray, w, h).unwrap();
        for radius in [0, 1, 2, 3, 10] {
            for y in 0..h {
                for x in 0..w {
                    let x0 = x.saturating_sub(radius);
                    let y0 = y.saturating_sub(radius);
                    let x1 = (x + radius).min(w - 1);
                    let y1 = (y + radius).min(h - 1);
                    let (sum, count) = integral.window(x, y, radius);
                    assert_eq!(sum, brute_force(&gray, w, x0, y0, x1, y1));
                    assert_eq!(count, ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64);
                }
            }
        }
    }

    #[test]
    fn test_corner_window_counts() {
        let gray = vec![1u8; 16];
        let integral = IntegralImage::build(&gray, 4, 4).unwrap();
        assert_eq!(integral.window(0, 0, 1), (4, 4));
        assert_eq!(integral.window(3, 0, 1), (4, 4));
        assert_eq!(integral.window(0, 3, 1), (4, 4));
        assert_eq!(integral.window(3, 3, 1), (4, 4));
        assert_eq!(integral.window(1, 1, 1), (9, 9));
        assert_eq!(integral.window(2, 2, 2), (16, 16));
    }

    #[test]
    fn test_full_white_frame_sum() {
        let (w, h) = (1024, 768);
        let gray = vec![255u8; w * h];
        let integral = IntegralImage::build(&gray, w, h).unwrap();
        assert_eq!(
            integral.window_sum(0, 0, w - 1, h - 1),
            255 * (w * h) as u64
        );
    }

    #[test]
    fn test_rebuild_reuses_and_resizes() {
        let mut integral = IntegralImage::build(&[1, 2, 3, 4], 2, 2).unwrap();
        assert_eq!(integral.window_sum(0, 0, 1, 1), 10);
        integral.rebuild(&[5, 5, 5], 3, 1).unwrap();
        assert_eq!(integral.width(), 3);
        assert_eq!(integral.window_sum(0, 0, 2, 0), 15);
    }

    #[test]
    fn test_size_mismatch() {
        let err = IntegralImage::build(&[0u8; 5], 2, 3).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFrame(_)));
        let err = IntegralImage::build(&[], usize::MAX / 2 + 1, 2).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFrame(_)));
    }
}
