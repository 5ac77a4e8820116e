//! Stack inspection command
//!
//! This module implements the command for summarizing a TIFF stack or
//! acquisition folder: frame count, geometry, sample type and, when a
//! frame index is given, the details of that frame.

use std::path::Path;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::stack::{FolderReader, StackReader};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::layout::FrameLayout;

/// Command for summarizing the structure of a stack
pub struct InfoCommand {
    /// Path to the input stack file or acquisition folder
    input: String,
    /// Frame to describe in detail, if any
    frame: Option<usize>,
}

impl InfoCommand {
    /// Create a new info command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let input = args
            .get_one::<String>("input")
            .ok_or_else(|| TiffError::GenericError("Missing input path".to_string()))?
            .clone();

        let frame = match args.get_one::<String>("frame") {
            Some(raw) => Some(raw.parse().map_err(|_| {
                TiffError::GenericError(format!("Invalid frame index '{}'", raw))
            })?),
            None => None,
        };

        Ok(InfoCommand { input, frame })
    }

    fn display_summary(&self, length: usize, shape: (usize, usize), layout: FrameLayout) {
        info!("Stack: {}", self.input);
        info!("  Frames: {}", length);
        info!("  Frame shape: {}x{} (height x width)", shape.0, shape.1);
        info!("  Sample layout: {:?}", layout.shape);
        info!("  Sample type: {}", layout.dtype.name());
        info!("  Frame size: {} bytes", layout.byte_len());
    }

    fn display_frame(&self, index: usize, byte_len: usize) {
        info!("Frame {}:", index);
        info!("  Decoded {} bytes", byte_len);
    }
}

impl Command for InfoCommand {
    fn execute(&self) -> TiffResult<()> {
        let path = Path::new(&self.input);

        if path.is_dir() {
            let mut reader = FolderReader::open_from_acquisition(path)?;
            info!(
                "Acquisition '{}' on channel {}",
                reader.acquisition_name(),
                reader.channel()
            );
            let length = reader.length();
            let shape = reader.shape();
            let layout = *reader.get(0)?.layout();
            self.display_summary(length, shape, layout);

            if let Some(index) = self.frame {
                let frame = reader.get(index)?;
                self.display_frame(index, frame.bytes().len());
            }
        } else {
            let mut reader = StackReader::open(path)?;
            let length = reader.length()?;
            let shape = reader.shape();
            let layout = reader.layout()?;
            self.display_summary(length, shape, layout);

            if let Some(index) = self.frame {
                let frame = reader.get(index)?;
                self.display_frame(index, frame.bytes().len());
            }
        }

        Ok(())
    }
}
