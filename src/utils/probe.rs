//! Boundary probing for sequences of unknown length
//!
//! TIFF files do not store their directory count anywhere, and a folder
//! of numbered frame files carries no manifest either. Both counts are
//! discovered the same way: a binary search over an existence predicate.

/// Finds the first index in `[0, ceiling)` where `exists` turns false
///
/// The predicate must be monotonic: true for every index below the
/// boundary and false at and above it. `exists(0)` is assumed true and
/// never evaluated; if everything up to the ceiling exists, the ceiling
/// itself is returned. The probe runs in O(log ceiling) evaluations,
/// avoiding a linear scan.
pub fn find_boundary<F>(mut exists: F, ceiling: usize) -> usize
where
    F: FnMut(usize) -> bool,
{
    let mut start = 0usize;
    let mut end = ceiling;

    while end - start > 1 {
        let middle = (start + end) / 2;
        if exists(middle) {
            start = middle;
        } else {
            end = middle;
        }
    }

    end
}
