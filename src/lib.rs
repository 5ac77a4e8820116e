//! Decoder and navigator for multi-page TIFF stacks
//!
//! Reads classic TIFF files containing many image directories, exposing
//! them as an indexable, iterable sequence of typed frames without
//! decoding more than the frame asked for. A folder adapter gives
//! per-frame-file acquisitions the same surface, and a small writer
//! produces uncompressed stacks the decoder reads back bit-exactly.

pub mod commands;
pub mod io;
pub mod stack;
pub mod tiff;
pub mod utils;

pub use stack::{FolderReader, StackReader};
pub use tiff::{
    save_frame, DecodedFrame, FrameLayout, FrameShape, SampleType, TiffBuilder, TiffError,
    TiffHandle, TiffResult,
};
