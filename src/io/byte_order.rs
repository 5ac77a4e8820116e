//! Byte order detection and reading strategies
//!
//! TIFF files declare their endianness in the first two header bytes;
//! every integer after that must be read accordingly. The handler trait
//! keeps that decision out of the parsing code.

use std::io::Result;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Endianness of a TIFF file, from the II/MM header marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// "II" (Intel) marker, little-endian
    LittleEndian,
    /// "MM" (Motorola) marker, big-endian
    BigEndian,
}

impl ByteOrder {
    /// Reads the two marker bytes and decides the byte order
    ///
    /// Anything other than II or MM fails with `InvalidByteOrder`
    /// carrying the offending marker value.
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        const LITTLE: u16 = u16::from_le_bytes(header::LITTLE_ENDIAN_MARKER);
        const BIG: u16 = u16::from_le_bytes(header::BIG_ENDIAN_MARKER);

        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            LITTLE => Ok(ByteOrder::LittleEndian),
            BIG => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::InvalidByteOrder(marker)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Boxes the matching reading strategy
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Reading strategy for one byte order
pub trait ByteOrderHandler: Send + Sync {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;
}

pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }
}

pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }
}
