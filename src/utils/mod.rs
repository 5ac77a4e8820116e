//! Utility functions shared across the crate

pub mod file_utils;
pub mod probe;
pub mod tag_utils;
pub mod write_utils;
