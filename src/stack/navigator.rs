//! Lazy navigation over a multi-directory TIFF stack
//!
//! `StackReader` wraps a `TiffHandle` and exposes the stack as an
//! indexable, iterable sequence of decoded frames. The directory count
//! is discovered once by binary-search probing and cached; the frame
//! layout is resolved on the first decode and reused for every
//! subsequent directory, under the explicit assumption that all
//! directories of one stack share the layout of the first one read.

use std::path::Path;

use log::{debug, info};

use crate::tiff::constants::PROBE_CEILING;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::{decode_current, DecodedFrame};
use crate::tiff::handle::TiffHandle;
use crate::tiff::layout::{resolve_layout, FrameLayout};
use crate::utils::probe::find_boundary;

/// Reader over the directory sequence of one multi-page TIFF file
pub struct StackReader {
    handle: TiffHandle,
    shape: (usize, usize),
    length: Option<usize>,
    layout: Option<FrameLayout>,
}

impl StackReader {
    /// Opens a TIFF stack from disk
    pub fn open<P: AsRef<Path>>(path: P) -> TiffResult<Self> {
        let path = path.as_ref();
        let reader = Self::from_handle(TiffHandle::open(path)?)?;
        info!("Opened stack {} with shape {:?}", path.display(), reader.shape);
        Ok(reader)
    }

    /// Wraps an already-open handle, reading the first directory's
    /// geometry
    pub fn from_handle(mut handle: TiffHandle) -> TiffResult<Self> {
        let shape = handle.dimensions()?;
        Ok(StackReader {
            handle,
            shape,
            length: None,
            layout: None,
        })
    }

    /// (height, width) of the first directory
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Total directory count
    ///
    /// Discovered on first call by probing `seek_directory` over an
    /// index range up to the hard ceiling of 65535; a failed seek is the
    /// termination signal here, not an error. The cursor is restored to
    /// directory 0 afterwards and the count is cached.
    pub fn length(&mut self) -> TiffResult<usize> {
        if let Some(length) = self.length {
            return Ok(length);
        }

        let handle = &mut self.handle;
        let length = find_boundary(|index| handle.seek_directory(index).is_ok(), PROBE_CEILING);
        self.handle.seek_directory(0)?;

        debug!("Probed directory count: {}", length);
        self.length = Some(length);
        Ok(length)
    }

    /// The frame layout shared by the whole stack
    ///
    /// Resolved from the current directory on first call and never
    /// recomputed.
    pub fn layout(&mut self) -> TiffResult<FrameLayout> {
        if let Some(layout) = self.layout {
            return Ok(layout);
        }

        let layout = resolve_layout(&mut self.handle)?;
        self.layout = Some(layout);
        Ok(layout)
    }

    /// Decodes the frame at the given directory index
    ///
    /// Fails with `DirectoryOutOfRange` for indices outside
    /// `[0, length())`.
    pub fn get(&mut self, index: usize) -> TiffResult<DecodedFrame> {
        let length = self.length()?;
        if index >= length {
            return Err(TiffError::DirectoryOutOfRange { index, length });
        }

        self.handle.seek_directory(index)?;
        let layout = self.layout()?;
        decode_current(&mut self.handle, &layout)
    }

    /// Index of the directory the cursor currently sits on
    pub fn current_directory(&self) -> usize {
        self.handle.current_directory()
    }

    /// Lazy forward iteration over the remaining frames
    ///
    /// Starts at whatever directory the cursor currently sits on and
    /// advances until the last directory, yielding each frame exactly
    /// once. Iterating from directory 0 therefore yields `length()`
    /// frames.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames {
            reader: self,
            started: false,
            finished: false,
        }
    }
}

/// Iterator over the frames of a stack, produced by
/// [`StackReader::frames`]
pub struct Frames<'a> {
    reader: &'a mut StackReader,
    started: bool,
    finished: bool,
}

impl Iterator for Frames<'_> {
    type Item = TiffResult<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.started {
            if self.reader.handle.is_last_directory() {
                self.finished = true;
                return None;
            }
            if let Err(e) = self.reader.handle.advance_directory() {
                self.finished = true;
                return Some(Err(e));
            }
        }
        self.started = true;

        let layout = match self.reader.layout() {
            Ok(layout) => layout,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        // any failure ends the iteration; later directories would just
        // repeat the same error
        let result = decode_current(&mut self.reader.handle, &layout);
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}
