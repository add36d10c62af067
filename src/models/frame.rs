use image::RgbImage;

use crate::error::{PipelineError, Result};

/// Horizontal/vertical chroma subsampling factors of a planar frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaSubsampling {
    /// Luma columns per chroma sample
    pub horizontal: usize,
    /// Luma rows per chroma sample
    pub vertical: usize,
}

impl ChromaSubsampling {
    /// 4:2:0, the usual camera stream layout
    pub const YUV420: Self = Self {
        horizontal: 2,
        vertical: 2,
    };
    /// 4:2:2
    pub const YUV422: Self = Self {
        horizontal: 2,
        vertical: 1,
    };
    /// 4:4:4, no subsampling
    pub const YUV444: Self = Self {
        horizontal: 1,
        vertical: 1,
    };

    /// Chroma plane dimensions for a `width`x`height` luma plane (rounded up)
    pub fn chroma_dimensions(&self, width: usize, height: usize) -> (usize, usize) {
        (
            width.div_ceil(self.horizontal),
            height.div_ceil(self.vertical),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.horizontal == 0 || self.vertical == 0 {
            return Err(PipelineError::InvalidFrame(format!(
                "chroma subsampling {}x{} has a zero factor",
                self.horizontal, self.vertical
            )));
        }
        Ok(())
    }
}

/// Samples in a `width` x `height` plane, or `InvalidFrame` if the product
/// does not fit in memory
pub(crate) fn plane_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or_else(|| {
            PipelineError::InvalidFrame(format!(
                "plane of {}x{} samples is too large",
                width, height
            ))
        })
}

impl Default for ChromaSubsampling {
    fn default() -> Self {
        Self::YUV420
    }
}

/// A planar sensor frame: one full resolution luma plane and two
/// subsampled chroma planes, read in {Y, U, V} order.
#[derive(Debug, Clone)]
pub struct RawFrame {
    width: usize,
    height: usize,
    subsampling: ChromaSubsampling,
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

impl RawFrame {
    /// Build a frame, checking that every plane matches the declared geometry
    pub fn new(
        width: usize,
        height: usize,
        subsampling: ChromaSubsampling,
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
    ) -> Result<Self> {
        let frame = Self {
            width,
            height,
            subsampling,
            y,
            u,
            v,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Encode an RGB still as a planar frame (BT.601 full range).
    ///
    /// Chroma is averaged over each subsampling block, so a frame built
    /// from a flat-colored image decodes back to that color.
    pub fn from_rgb(rgb: &RgbImage, subsampling: ChromaSubsampling) -> Result<Self> {
        subsampling.validate()?;
        let width = rgb.width() as usize;
        let height = rgb.height() as usize;
        let (cw, ch) = subsampling.chroma_dimensions(width, height);

        let mut y = Vec::with_capacity(width * height);
        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            y.push(rgb_to_y(r, g, b));
        }

        let mut u = Vec::with_capacity(cw * ch);
        let mut v = Vec::with_capacity(cw * ch);
        for cy in 0..ch {
            for cx in 0..cw {
                let x0 = cx * subsampling.horizontal;
                let y0 = cy * subsampling.vertical;
                let x1 = (x0 + subsampling.horizontal).min(width);
                let y1 = (y0 + subsampling.vertical).min(height);

                let (mut cb_sum, mut cr_sum, mut count) = (0i64, 0i64, 0i64);
                for py in y0..y1 {
                    for px in x0..x1 {
                        let [r, g, b] = rgb.get_pixel(px as u32, py as u32).0;
                        let (cb, cr) = rgb_to_cbcr(r, g, b);
                        cb_sum += cb as i64;
                        cr_sum += cr as i64;
                        count += 1;
                    }
                }
                u.push(((cb_sum + count / 2) / count) as u8);
                v.push(((cr_sum + count / 2) / count) as u8);
            }
        }

        Self::new(width, height, subsampling, y, u, v)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidFrame(format!(
                "frame dimensions {}x{} must be positive",
                self.width, self.height
            )));
        }
        self.subsampling.validate()?;

        let luma = plane_len(self.width, self.height)?;
        if self.y.len() != luma {
            return Err(PipelineError::plane_size("Y", luma, self.y.len()));
        }
        let (cw, ch) = self.chroma_dimensions();
        let chroma = plane_len(cw, ch)?;
        if self.u.len() != chroma {
            return Err(PipelineError::plane_size("U", chroma, self.u.len()));
        }
        if self.v.len() != chroma {
            return Err(PipelineError::plane_size("V", chroma, self.v.len()));
        }
        Ok(())
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Declared chroma subsampling
    pub fn subsampling(&self) -> ChromaSubsampling {
        self.subsampling
    }

    /// Chroma plane dimensions
    pub fn chroma_dimensions(&self) -> (usize, usize) {
        self.subsampling.chroma_dimensions(self.width, self.height)
    }

    /// Number of luma samples (W x H)
    pub fn luma_len(&self) -> usize {
        self.y.len()
    }

    /// Number of samples in each chroma plane
    pub fn chroma_len(&self) -> usize {
        self.u.len()
    }

    /// Luma plane
    pub fn y_plane(&self) -> &[u8] {
        &self.y
    }

    /// First chroma plane (Cb)
    pub fn u_plane(&self) -> &[u8] {
        &self.u
    }

    /// Second chroma plane (Cr)
    pub fn v_plane(&self) -> &[u8] {
        &self.v
    }
}

// Fixed point BT.601 full range, 16 fractional bits
fn rgb_to_y(r: u8, g: u8, b: u8) -> u8 {
    let y = 19595 * r as i32 + 38470 * g as i32 + 7471 * b as i32;
    ((y + 32768) >> 16).clamp(0, 255) as u8
}

fn rgb_to_cbcr(r: u8, g: u8, b: u8) -> (u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let cb = (-11059 * r - 21709 * g + 32768 * b + (128 << 16) + 32768) >> 16;
    let cr = (32768 * r - 27439 * g - 5329 * b + (128 << 16) + 32768) >> 16;
    (cb.clamp(0, 255) as u8, cr.clamp(0, 255) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chroma_dimensions_round_up() {
        assert_eq!(ChromaSubsampling::YUV420.chroma_dimensions(640, 480), (320, 240));
        assert_eq!(ChromaSubsampling::YUV420.chroma_dimensions(5, 3), (3, 2));
        assert_eq!(ChromaSubsampling::YUV422.chroma_dimensions(5, 3), (3, 3));
        assert_eq!(ChromaSubsampling::YUV444.chroma_dimensions(5, 3), (5, 3));
    }

    #[test]
    fn test_new_accepts_consistent_planes() {
        let frame = RawFrame::new(
            4,
            2,
            ChromaSubsampling::YUV420,
            vec![0; 8],
            vec![128; 2],
            vec![128; 2],
        )
        .unwrap();
        assert_eq!(frame.luma_len(), 8);
        assert_eq!(frame.chroma_len(), 2);
    }

    #[test]
    fn test_short_luma_plane_is_rejected() {
        let err = RawFrame::new(
            4,
            4,
            ChromaSubsampling::YUV420,
            vec![0; 15],
            vec![128; 4],
            vec![128; 4],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFrame(_)));
    }

    #[test]
    fn test_chroma_plane_mismatch_is_rejected() {
        let err = RawFrame::new(
            4,
            4,
            ChromaSubsampling::YUV420,
            vec![0; 16],
            vec![128; 4],
            vec![128; 5],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFrame(_)));
    }

    #[test]
    fn test_zero_dimensions_and_factors_are_rejected() {
        assert!(RawFrame::new(0, 4, ChromaSubsampling::YUV420, vec![], vec![], vec![]).is_err());
        let zero = ChromaSubsampling {
            horizontal: 0,
            vertical: 2,
        };
        assert!(RawFrame::new(2, 2, zero, vec![0; 4], vec![], vec![]).is_err());
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let oversized = [(usize::MAX, 2), (usize::MAX / 2 + 1, 2), (usize::MAX / 3, 4)];
        for (width, height) in oversized {
            let err = RawFrame::new(
                width,
                height,
                ChromaSubsampling::YUV444,
                vec![],
                vec![],
                vec![],
            )
            .unwrap_err();
            assert!(matches!(err, PipelineError::InvalidFrame(_)), "{}x{}", width, height);
        }
        assert!(plane_len(usize::MAX, 1).is_err());
        assert_eq!(plane_len(640, 480).unwrap(), 307_200);
    }

    #[test]
    fn test_from_rgb_gray_has_neutral_chroma() {
        let rgb = RgbImage::from_pixel(6, 4, image::Rgb([90, 90, 90]));
        let frame = RawFrame::from_rgb(&rgb, ChromaSubsampling::YUV420).unwrap();
        assert!(frame.y_plane().iter().all(|&y| y == 90));
        assert!(frame.u_plane().iter().all(|&u| u == 128));
        assert!(frame.v_plane().iter().all(|&v| v == 128));
    }
}
