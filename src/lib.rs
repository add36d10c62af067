//! maze_vision - camera frame binarization for maze solving
//!
//! Turns a planar YUV camera frame into a two-level image a maze solver
//! can walk: the frame is decoded to RGB, reduced to luminance and
//! thresholded against the mean of a window around each pixel
//! (Bradley-Roth), so uneven lighting across the photographed maze does
//! not produce spurious walls.
//!
//! ```
//! use maze_vision::{ChromaSubsampling, RawFrame, binarize};
//!
//! let (w, h) = (64, 48);
//! let frame = RawFrame::new(
//!     w,
//!     h,
//!     ChromaSubsampling::YUV420,
//!     vec![200; w * h],
//!     vec![128; (w / 2) * (h / 2)],
//!     vec![128; (w / 2) * (h / 2)],
//! )
//! .unwrap();
//! let binary = binarize(&frame, None, None).unwrap();
//! assert_eq!(binary.count_foreground(), 0);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Binarization settings and environment overrides
pub mod config;
/// Pipeline error type
pub mod error;
/// Logging setup for host applications
pub mod logger;
/// Frame and image data structures (RawFrame, BinaryImage)
pub mod models;
/// Decoder -> reducer -> binarizer orchestration
pub mod pipeline;
/// Display orientation for live preview
pub mod preview;
/// Image processing stages (YUV decode, luminance, integral image, thresholding)
pub mod utils;
/// Background frame processing fed by a capture callback
pub mod worker;

pub use config::BinarizeConfig;
pub use error::{PipelineError, Result};
pub use models::{BinaryImage, ChromaSubsampling, RawFrame};
pub use pipeline::{Pipeline, StageTimings, binarize};
pub use utils::binarization::ThresholdParams;
pub use worker::{FrameOutcome, FrameSink, FrameWorker, WorkerStats};
