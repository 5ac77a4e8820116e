//! Folder-of-frames adapter
//!
//! Some acquisition software writes one single-directory TIFF per frame
//! into a folder, named `{name}_Cycle00001_Ch{channel}_{index:06}.ome.tif`
//! with a 1-based index, alongside a `{name}.env` descriptor file.
//! `FolderReader` presents such a folder through the same indexable,
//! iterable surface as a single multi-page stack.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::tiff::constants::PROBE_CEILING;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::{decode_current, DecodedFrame};
use crate::tiff::handle::TiffHandle;
use crate::tiff::layout::{resolve_layout, FrameLayout};
use crate::utils::probe::find_boundary;

lazy_static! {
    static ref FIRST_FRAME_RE: Regex =
        Regex::new(r"^(?P<name>.+)_Cycle00001_Ch(?P<channel>\d+)_000001\.ome\.tif$").unwrap();
}

/// Builds the filename of one frame in an acquisition folder
///
/// `index` is zero-based; the on-disk numbering starts at 1.
pub fn frame_file_name(name: &str, channel: u32, index: usize) -> String {
    format!("{}_Cycle00001_Ch{}_{:06}.ome.tif", name, channel, index + 1)
}

/// Reader over a folder of per-frame TIFF files
pub struct FolderReader {
    folder: PathBuf,
    name: String,
    channel: u32,
    shape: (usize, usize),
    length: usize,
    layout: Option<FrameLayout>,
}

impl FolderReader {
    /// Opens an acquisition folder given its name and channel
    ///
    /// Reads the first frame for the stack geometry and probes the file
    /// numbering for the frame count.
    pub fn new<P: AsRef<Path>>(folder: P, name: &str, channel: u32) -> TiffResult<Self> {
        let folder = folder.as_ref().to_path_buf();
        if !folder.exists() {
            return Err(TiffError::NotFound(folder.display().to_string()));
        }
        if !folder.is_dir() {
            return Err(TiffError::NotADirectory(folder.display().to_string()));
        }

        let first = folder.join(frame_file_name(name, channel, 0));
        let mut handle = TiffHandle::open(&first)?;
        let shape = handle.dimensions()?;

        let length = find_boundary(
            |index| folder.join(frame_file_name(name, channel, index)).is_file(),
            PROBE_CEILING,
        );

        info!(
            "Opened acquisition folder {} ({} frames of {:?})",
            folder.display(),
            length,
            shape
        );

        Ok(FolderReader {
            folder,
            name: name.to_string(),
            channel,
            shape,
            length,
            layout: None,
        })
    }

    /// Opens an acquisition folder by locating its `.env` descriptor
    ///
    /// The descriptor's file stem is the acquisition name; the channel
    /// number is recovered from the first frame's filename.
    pub fn open_from_acquisition<P: AsRef<Path>>(folder: P) -> TiffResult<Self> {
        let folder = folder.as_ref();
        if !folder.exists() {
            return Err(TiffError::NotFound(folder.display().to_string()));
        }
        if !folder.is_dir() {
            return Err(TiffError::NotADirectory(folder.display().to_string()));
        }

        let name = Self::descriptor_name(folder)?;
        let channel = Self::detect_channel(folder, &name)?;
        debug!("Acquisition '{}' on channel {}", name, channel);

        Self::new(folder, &name, channel)
    }

    fn descriptor_name(folder: &Path) -> TiffResult<String> {
        for entry in std::fs::read_dir(folder)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("env") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    return Ok(stem.to_string());
                }
            }
        }
        Err(TiffError::NotFound(format!(
            "no .env descriptor in {}",
            folder.display()
        )))
    }

    fn detect_channel(folder: &Path, name: &str) -> TiffResult<u32> {
        for entry in std::fs::read_dir(folder)? {
            let path = entry?.path();
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if let Some(caps) = FIRST_FRAME_RE.captures(file_name) {
                if &caps["name"] == name {
                    if let Ok(channel) = caps["channel"].parse() {
                        return Ok(channel);
                    }
                }
            }
        }
        Err(TiffError::NotFound(format!(
            "no first frame for acquisition '{}' in {}",
            name,
            folder.display()
        )))
    }

    /// Number of frame files in the folder
    pub fn length(&self) -> usize {
        self.length
    }

    /// (height, width) of the first frame
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Channel number the frame files belong to
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Acquisition name shared by all frame files
    pub fn acquisition_name(&self) -> &str {
        &self.name
    }

    /// Filename of the frame at a zero-based index
    pub fn frame_name(&self, index: usize) -> String {
        frame_file_name(&self.name, self.channel, index)
    }

    /// Full path of the frame at a zero-based index
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.folder.join(self.frame_name(index))
    }

    /// Decodes the frame at the given index
    ///
    /// Each call opens the frame's file fresh; nothing is kept open
    /// between calls. The layout resolved from the first decoded frame
    /// is reused for all later ones.
    pub fn get(&mut self, index: usize) -> TiffResult<DecodedFrame> {
        if index >= self.length {
            return Err(TiffError::DirectoryOutOfRange {
                index,
                length: self.length,
            });
        }

        let mut handle = TiffHandle::open(self.frame_path(index))?;
        let layout = match self.layout {
            Some(layout) => layout,
            None => {
                let layout = resolve_layout(&mut handle)?;
                self.layout = Some(layout);
                layout
            }
        };
        decode_current(&mut handle, &layout)
    }

    /// Iterates over all frames in index order
    pub fn frames(&mut self) -> FolderFrames<'_> {
        FolderFrames {
            reader: self,
            index: 0,
        }
    }
}

/// Iterator over the frames of a folder, produced by
/// [`FolderReader::frames`]
pub struct FolderFrames<'a> {
    reader: &'a mut FolderReader,
    index: usize,
}

impl Iterator for FolderFrames<'_> {
    type Item = TiffResult<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.reader.length {
            return None;
        }
        let frame = self.reader.get(self.index);
        self.index += 1;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::frame_file_name;

    #[test]
    fn frame_names_are_one_based_and_padded() {
        assert_eq!(
            frame_file_name("acq", 2, 0),
            "acq_Cycle00001_Ch2_000001.ome.tif"
        );
        assert_eq!(
            frame_file_name("acq", 2, 49),
            "acq_Cycle00001_Ch2_000050.ome.tif"
        );
    }
}
