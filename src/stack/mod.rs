//! Stack-level access to TIFF frame sequences
//!
//! Two readers share one surface: `StackReader` for a single
//! multi-directory file, `FolderReader` for a folder of per-frame
//! files produced by acquisition software.

pub mod folder;
pub mod navigator;

pub use folder::{frame_file_name, FolderReader};
pub use navigator::StackReader;
