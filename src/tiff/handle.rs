//! Open TIFF file handle with an explicit directory cursor
//!
//! The handle owns the underlying reader exclusively and keeps the
//! "current directory" as an explicit, inspectable field rather than
//! implicit OS-level cursor state. Directory offsets are discovered
//! lazily by walking the IFD chain and cached, so seeking backwards
//! or probing for the directory count never re-parses entry tables
//! it has already skipped over.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{header, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::utils::tag_utils;

/// An open TIFF file positioned on one of its directories
///
/// Dropping the handle releases the underlying OS resource; there is no
/// explicit close call and no reliance on deferred finalization.
pub struct TiffHandle {
    reader: Box<dyn SeekableReader>,
    byte_order_handler: Box<dyn ByteOrderHandler>,
    file_size: u64,
    /// Offsets of the directories discovered so far, index-aligned
    directory_offsets: Vec<u64>,
    /// Index of the directory the cursor currently sits on
    current: usize,
    /// Parsed entry table of the current directory
    ifd: IFD,
    /// Offset of the directory after the current one, 0 if none
    next_offset: u64,
    /// Strip offset/byte-count tables of the current directory
    strips: Option<(Vec<u64>, Vec<u64>)>,
}

impl TiffHandle {
    /// Opens a TIFF file from disk
    ///
    /// Fails with `NotFound` if the path does not exist and with a header
    /// error (`InvalidByteOrder`, `UnsupportedVersion`, `InvalidHeader`)
    /// if the file is not a classic TIFF.
    pub fn open<P: AsRef<Path>>(path: P) -> TiffResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TiffError::NotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(64 * 1024, file);
        debug!("Opened TIFF file: {}", path.display());

        Self::from_reader(Box::new(reader))
    }

    /// Builds a handle from any seekable byte source
    ///
    /// Parses the header (byte order marker, version, first IFD offset)
    /// and positions the cursor on directory 0.
    pub fn from_reader(mut reader: Box<dyn SeekableReader>) -> TiffResult<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = ByteOrder::detect(&mut *reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        let byte_order_handler = byte_order.create_handler();

        let version = byte_order_handler.read_u16(&mut *reader)?;
        if version != header::TIFF_VERSION {
            // BigTIFF (43) lands here too; only classic 32-bit offsets are read
            return Err(TiffError::UnsupportedVersion(version));
        }

        let first_offset = byte_order_handler.read_u32(&mut *reader)? as u64;
        if first_offset < header::HEADER_SIZE || first_offset >= file_size {
            return Err(TiffError::InvalidHeader);
        }

        let (ifd, next_offset) =
            read_ifd_at(&mut *reader, &byte_order_handler, first_offset, 0)?;
        debug!("Directory 0 at offset {} with {} entries", first_offset, ifd.entry_count());

        Ok(TiffHandle {
            reader,
            byte_order_handler,
            file_size,
            directory_offsets: vec![first_offset],
            current: 0,
            ifd,
            next_offset,
            strips: None,
        })
    }

    /// Index of the directory the cursor currently sits on
    pub fn current_directory(&self) -> usize {
        self.current
    }

    /// The parsed entry table of the current directory
    pub fn directory(&self) -> &IFD {
        &self.ifd
    }

    /// Reports whether the current directory is the final one in the file
    pub fn is_last_directory(&self) -> bool {
        self.next_offset == 0
    }

    /// Moves the cursor to the directory with the given zero-based index
    ///
    /// Fails with `DirectoryOutOfRange` if the IFD chain ends before the
    /// requested index. This is the only reliable existence probe for a
    /// directory; the total count is not stored anywhere in the file.
    pub fn seek_directory(&mut self, index: usize) -> TiffResult<()> {
        if index == self.current {
            return Ok(());
        }

        let offset = self.offset_of(index)?;
        let (ifd, next_offset) =
            read_ifd_at(&mut *self.reader, &self.byte_order_handler, offset, index)?;

        self.current = index;
        self.ifd = ifd;
        self.next_offset = next_offset;
        self.strips = None;
        Ok(())
    }

    /// Moves the cursor to the directory after the current one
    pub fn advance_directory(&mut self) -> TiffResult<()> {
        if self.next_offset == 0 {
            return Err(TiffError::DirectoryOutOfRange {
                index: self.current + 1,
                length: self.current + 1,
            });
        }

        self.seek_directory(self.current + 1)
    }

    /// Returns the first value of a directory tag, or `None` if the
    /// current directory does not define it (the caller supplies defaults)
    pub fn get_field(&mut self, tag: u16) -> TiffResult<Option<u64>> {
        let entry = match self.ifd.get_entry(tag) {
            Some(entry) => entry.clone(),
            None => return Ok(None),
        };

        let values = self.read_entry_values(&entry)?;
        Ok(values.first().copied())
    }

    /// Returns the full value array of a directory tag
    ///
    /// Fails with `TagNotFound` if the current directory does not define it.
    pub fn get_field_values(&mut self, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = self
            .ifd
            .get_entry(tag)
            .cloned()
            .ok_or(TiffError::TagNotFound(tag))?;

        self.read_entry_values(&entry)
    }

    /// Returns (height, width) of the current directory's image
    pub fn dimensions(&mut self) -> TiffResult<(usize, usize)> {
        let height = self
            .get_field(tags::IMAGE_LENGTH)?
            .ok_or(TiffError::MissingDimensions)?;
        let width = self
            .get_field(tags::IMAGE_WIDTH)?
            .ok_or(TiffError::MissingDimensions)?;
        Ok((height as usize, width as usize))
    }

    /// Number of strips in the current directory
    pub fn strip_count(&mut self) -> TiffResult<usize> {
        self.ensure_strip_tables()?;
        Ok(self.strips.as_ref().map(|(offsets, _)| offsets.len()).unwrap_or(0))
    }

    /// Reads the raw encoded bytes of one strip of the current directory
    ///
    /// A strip that runs past end-of-file yields the bytes actually
    /// available; the strip decoder is responsible for surfacing the
    /// shortfall.
    pub fn read_strip(&mut self, strip_index: usize) -> TiffResult<Vec<u8>> {
        self.ensure_strip_tables()?;
        let (offset, byte_count) = {
            let (offsets, counts) = self.strips.as_ref().unwrap();
            if strip_index >= offsets.len() {
                return Err(TiffError::GenericError(format!(
                    "Strip index {} out of range ({} strips)",
                    strip_index,
                    offsets.len()
                )));
            }
            (offsets[strip_index], counts[strip_index])
        };

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut data = Vec::with_capacity(byte_count as usize);
        let mut limited = (&mut self.reader).take(byte_count);
        limited.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Resolves the file offset of a directory, extending the cached
    /// chain of known offsets as needed
    fn offset_of(&mut self, index: usize) -> TiffResult<u64> {
        while self.directory_offsets.len() <= index {
            let last = *self.directory_offsets.last().unwrap();
            let next = if self.directory_offsets.len() == self.current + 1 {
                // The cursor already sits on the last known directory;
                // its next-offset field has been read.
                self.next_offset
            } else {
                self.peek_next_offset(last)?
            };

            if next == 0 {
                return Err(TiffError::DirectoryOutOfRange {
                    index,
                    length: self.directory_offsets.len(),
                });
            }
            if next < header::HEADER_SIZE || next >= self.file_size {
                return Err(TiffError::GenericError(format!(
                    "Invalid next IFD offset: {} (file size: {})",
                    next, self.file_size
                )));
            }

            self.directory_offsets.push(next);
        }

        Ok(self.directory_offsets[index])
    }

    /// Reads the next-IFD offset of the directory at `offset` without
    /// parsing its entries
    fn peek_next_offset(&mut self, offset: u64) -> TiffResult<u64> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let entry_count = self.byte_order_handler.read_u16(&mut *self.reader)? as i64;
        self.reader.seek(SeekFrom::Current(entry_count * 12))?;
        Ok(self.byte_order_handler.read_u32(&mut *self.reader)? as u64)
    }

    /// Decodes the value array of an entry, inline or at its offset
    fn read_entry_values(&mut self, entry: &IFDEntry) -> TiffResult<Vec<u64>> {
        let mut values = Vec::with_capacity(entry.count as usize);

        if entry.is_value_inline() {
            let mut cursor = std::io::Cursor::new(entry.raw_value);
            tag_utils::read_tag_value_array(
                &mut cursor,
                entry,
                &self.byte_order_handler,
                &mut values,
            )?;
        } else {
            self.reader.seek(SeekFrom::Start(entry.value_offset))?;
            tag_utils::read_tag_value_array(
                &mut *self.reader,
                entry,
                &self.byte_order_handler,
                &mut values,
            )?;
        }

        Ok(values)
    }

    /// Loads the strip offset/byte-count tables of the current directory
    fn ensure_strip_tables(&mut self) -> TiffResult<()> {
        if self.strips.is_some() {
            return Ok(());
        }

        let offsets = self.get_field_values(tags::STRIP_OFFSETS)?;
        let counts = self.get_field_values(tags::STRIP_BYTE_COUNTS)?;
        if offsets.len() != counts.len() {
            return Err(TiffError::GenericError(format!(
                "StripOffsets has {} entries but StripByteCounts has {}",
                offsets.len(),
                counts.len()
            )));
        }

        self.strips = Some((offsets, counts));
        Ok(())
    }
}

/// Parses the IFD at the given offset, returning it together with the
/// offset of the following IFD (0 if this is the last one)
fn read_ifd_at(
    reader: &mut dyn SeekableReader,
    handler: &Box<dyn ByteOrderHandler>,
    offset: u64,
    number: usize,
) -> TiffResult<(IFD, u64)> {
    reader.seek(SeekFrom::Start(offset))?;

    let entry_count = handler.read_u16(reader)?;
    let mut ifd = IFD::new(number, offset);

    for _ in 0..entry_count {
        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = handler.read_u32(reader)? as u64;

        let mut raw_value = [0u8; 4];
        reader.read_exact(&mut raw_value)?;
        let value_offset =
            handler.read_u32(&mut std::io::Cursor::new(raw_value))? as u64;

        ifd.add_entry(IFDEntry::new(tag, field_type, count, value_offset, raw_value));
    }

    let next_offset = handler.read_u32(reader)? as u64;
    Ok((ifd, next_offset))
}
