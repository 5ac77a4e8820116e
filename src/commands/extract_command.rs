//! Frame extraction command
//!
//! This module implements the command for pulling a single frame out of
//! a stack and writing it to its own single-directory TIFF file.

use std::path::Path;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::stack::{FolderReader, StackReader};
use crate::tiff::builder::save_frame;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::DecodedFrame;

/// Command for extracting one frame to a standalone file
pub struct ExtractCommand {
    /// Path to the input stack file or acquisition folder
    input: String,
    /// Frame to extract
    frame: usize,
    /// Where to write the extracted frame
    output: String,
}

impl ExtractCommand {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let input = args
            .get_one::<String>("input")
            .ok_or_else(|| TiffError::GenericError("Missing input path".to_string()))?
            .clone();

        let frame = match args.get_one::<String>("frame") {
            Some(raw) => raw.parse().map_err(|_| {
                TiffError::GenericError(format!("Invalid frame index '{}'", raw))
            })?,
            None => 0,
        };

        let output = args
            .get_one::<String>("output")
            .ok_or_else(|| {
                TiffError::GenericError("Extraction requires --output".to_string())
            })?
            .clone();

        Ok(ExtractCommand { input, frame, output })
    }

    fn read_frame(&self) -> TiffResult<DecodedFrame> {
        let path = Path::new(&self.input);
        if path.is_dir() {
            FolderReader::open_from_acquisition(path)?.get(self.frame)
        } else {
            StackReader::open(path)?.get(self.frame)
        }
    }
}

impl Command for ExtractCommand {
    fn execute(&self) -> TiffResult<()> {
        let frame = self.read_frame()?;
        save_frame(&self.output, &frame)?;
        info!("Extracted frame {} to {}", self.frame, self.output);
        Ok(())
    }
}
