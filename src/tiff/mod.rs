//! TIFF format handling
//!
//! Header and directory parsing, tag access, frame layout resolution,
//! strip decoding and file construction for classic (non-Big) TIFF.

pub mod builder;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod handle;
pub mod ifd;
pub mod layout;

#[cfg(test)]
mod tests;

pub use builder::{save_frame, TiffBuilder};
pub use errors::{TiffError, TiffResult};
pub use frame::{decode_current, DecodedFrame};
pub use handle::TiffHandle;
pub use ifd::{IFDEntry, IFD};
pub use layout::{resolve_layout, FrameLayout, FrameShape, SampleType};
