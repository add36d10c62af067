/// Bit-packed two-level output image
pub mod binary;
/// Planar sensor frames and chroma subsampling
pub mod frame;

pub use binary::BinaryImage;
pub use frame::{ChromaSubsampling, RawFrame};
