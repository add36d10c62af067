//! Image processing stages
//!
//! This module provides the building blocks of the pipeline:
//! - YUV frame decoding (planar sensor frame to interleaved RGB)
//! - Luminance reduction (RGB to 8-bit intensity)
//! - Integral image (O(1) window sums)
//! - Binarization (Bradley-Roth local mean and a global cutoff)
//! - Memory pools (buffer reuse between frames)

pub mod binarization;
pub mod grayscale;
pub mod integral;
pub mod memory_pool;
pub mod yuv;
