//! TIFF writing utilities
//!
//! Helper functions for writing TIFF files to disk, handling alignment
//! and padding details.

use std::io::Write;

use crate::tiff::errors::TiffResult;

/// Align an offset to a 4-byte boundary
///
/// TIFF recommends aligning data on word boundaries. This function
/// returns the next 4-byte aligned position given a current offset.
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Write zero padding up to the next 4-byte boundary
///
/// `pos` is the absolute file position after the bytes just written;
/// padding by region length alone drifts from planned offsets whenever
/// a region starts unaligned. Returns the aligned position.
pub fn pad_to_alignment(writer: &mut impl Write, pos: u64) -> TiffResult<u64> {
    let aligned = align_to_4_bytes(pos);
    if aligned > pos {
        writer.write_all(&vec![0u8; (aligned - pos) as usize])?;
    }
    Ok(aligned)
}
