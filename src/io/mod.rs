//! Low-level I/O abstractions

pub mod byte_order;
pub mod seekable;
