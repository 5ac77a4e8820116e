//! Acquisition filename helpers
//!
//! The acquisition software embeds metadata in its output filenames;
//! these helpers pull it back out.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FRAME_COUNT_RE: Regex = Regex::new(r"(\d+)Frames").unwrap();
}

/// Parses the frame count token out of an acquisition filename
///
/// Filenames such as `run3-00120Frames_Ch1.tif` carry the number of
/// frames written, suffixed with `Frames`. Returns `None` when the
/// filename carries no such token.
pub fn written_frame_count<P: AsRef<Path>>(path: P) -> Option<u64> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let caps = FRAME_COUNT_RE.captures(stem)?;
    caps[1].parse().ok()
}
