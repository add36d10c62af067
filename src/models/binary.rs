use image::{GrayImage, Luma};
use rayon::prelude::*;

/// Compact two-level image, `true` = foreground.
///
/// Rows are padded to a whole number of bytes so each row can be
/// written independently of its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl BinaryImage {
    /// Create an all-background image with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height],
        }
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per packed row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Get label at (x, y); out of bounds reads as background
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.stride + x / 8];
        (byte >> (x % 8)) & 1 == 1
    }

    /// Set label at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let byte = &mut self.data[y * self.stride + x / 8];
        if value {
            *byte |= 1 << (x % 8);
        } else {
            *byte &= !(1 << (x % 8));
        }
    }

    /// Packed bytes of row `y` (LSB first), `None` past the last row
    pub fn row_bytes(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        Some(&self.data[start..start + self.stride])
    }

    /// Mutable packed rows, one chunk of `stride` bytes per image row
    pub(crate) fn par_rows_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, u8> {
        let stride = self.stride.max(1);
        self.data.par_chunks_exact_mut(stride)
    }

    /// Packed data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reset every pixel to background, resizing if dimensions changed
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.stride = width.div_ceil(8);
        self.data.clear();
        self.data.resize(self.stride * height, 0);
    }

    /// Number of foreground pixels
    pub fn count_foreground(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Render as an 8-bit image: foreground black (0), background white (255)
    pub fn to_luma_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.get(x as usize, y as usize) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

impl Default for BinaryImage {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Pack one row of labels into `row` (LSB first)
pub(crate) fn pack_row(row: &mut [u8], labels: impl Iterator<Item = bool>) {
    row.fill(0);
    for (x, value) in labels.enumerate() {
        if value {
            row[x / 8] |= 1 << (x % 8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_image() {
        let mut image = BinaryImage::new(10, 3);
        assert_eq!(image.width(), 10);
        assert_eq!(image.height(), 3);
        assert_eq!(image.stride(), 2);

        image.set(9, 1, true);
        assert!(image.get(9, 1));
        assert!(!image.get(8, 1));
        assert!(!image.get(9, 2));
        assert_eq!(image.count_foreground(), 1);

        image.set(9, 1, false);
        assert_eq!(image.count_foreground(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut image = BinaryImage::new(8, 8);
        image.set(10, 10, true);
        assert!(!image.get(10, 10));
        assert_eq!(image.count_foreground(), 0);
    }

    #[test]
    fn test_padding_bits_stay_clear() {
        let mut image = BinaryImage::new(3, 2);
        image
            .par_rows_mut()
            .enumerate()
            .for_each(|(y, row)| pack_row(row, (0..3).map(|x| (x + y) % 2 == 0)));
        assert!(image.get(0, 0));
        assert!(!image.get(1, 0));
        assert!(image.get(1, 1));
        assert_eq!(image.count_foreground(), 3);
    }

    #[test]
    fn test_row_bytes() {
        let mut image = BinaryImage::new(10, 3);
        image.set(0, 1, true);
        image.set(9, 1, true);
        assert_eq!(image.row_bytes(0), Some(&[0u8, 0][..]));
        assert_eq!(image.row_bytes(1), Some(&[0b0000_0001u8, 0b0000_0010][..]));
        assert_eq!(image.row_bytes(3), None);
    }

    #[test]
    fn test_to_luma_image() {
        let mut image = BinaryImage::new(2, 1);
        image.set(0, 0, true);
        let gray = image.to_luma_image();
        assert_eq!(gray.get_pixel(0, 0).0, [0]);
        assert_eq!(gray.get_pixel(1, 0).0, [255]);
    }

    #[test]
    fn test_reset_resizes() {
        let mut image = BinaryImage::new(4, 4);
        image.set(1, 1, true);
        image.reset(9, 2);
        assert_eq!(image.stride(), 2);
        assert_eq!(image.as_bytes().len(), 4);
        assert_eq!(image.count_foreground(), 0);
    }
}
