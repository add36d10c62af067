//! Reusable scratch buffers for back-to-back frames
//!
//! Provides pre-allocated buffers for:
//! - Luminance conversion
//! - The summed-area table used by the adaptive threshold
//!
//! A pool is owned by exactly one pipeline invocation at a time.

use crate::utils::integral::IntegralImage;

/// Scratch buffers kept alive between frames of similar size
#[derive(Debug, Default)]
pub struct BufferPool {
    luma_buffer: Vec<u8>,
    integral: IntegralImage,
    stats: AllocationStats,
}

impl BufferPool {
    /// Create a new, empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool with room for `pixels` luma samples up front
    pub fn with_capacity(pixels: usize) -> Self {
        Self {
            luma_buffer: Vec::with_capacity(pixels),
            ..Self::default()
        }
    }

    /// Hand out the luma buffer (resized to `size`) and the integral scratch
    /// together, so both can be borrowed at once
    pub fn split_buffers(&mut self, size: usize) -> (&mut [u8], &mut IntegralImage) {
        if size > self.luma_buffer.capacity() {
            self.stats.record_allocation();
        } else {
            self.stats.record_reuse(size);
        }
        self.luma_buffer.resize(size, 0);
        (&mut self.luma_buffer[..size], &mut self.integral)
    }

    /// Current luma buffer capacity in bytes
    pub fn luma_capacity(&self) -> usize {
        self.luma_buffer.capacity()
    }

    /// Allocation counters
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    /// Clear all buffers (resets lengths but keeps capacity)
    pub fn clear(&mut self) {
        self.luma_buffer.clear();
    }
}

/// Statistics for monitoring allocation patterns
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
    /// Frames served from existing capacity
    pub reuses: usize,
    /// Frames that needed the luma buffer to grow
    pub allocations: usize,
    /// Total bytes served without allocating
    pub total_bytes_reused: usize,
}

impl AllocationStats {
    fn record_reuse(&mut self, bytes: usize) {
        self.reuses += 1;
        self.total_bytes_reused += bytes;
    }

    fn record_allocation(&mut self) {
        self.allocations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_pool_basic() {
        let mut pool = BufferPool::new();

        let (buf, _) = pool.split_buffers(100);
        assert_eq!(buf.len(), 100);

        let (buf, _) = pool.split_buffers(50);
        assert_eq!(buf.len(), 50);

        assert_eq!(pool.stats().allocations, 1);
        assert_eq!(pool.stats().reuses, 1);
        assert_eq!(pool.stats().total_bytes_reused, 50);
    }

    #[test]
    fn test_buffer_pool_growth() {
        let mut pool = BufferPool::with_capacity(100);

        let (buf, _) = pool.split_buffers(500);
        assert_eq!(buf.len(), 500);
        assert!(pool.luma_capacity() >= 500);
        assert_eq!(pool.stats().allocations, 1);

        pool.clear();
        assert!(pool.luma_capacity() >= 500);
    }
}
