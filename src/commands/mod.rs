//! CLI command implementations
//!
//! This module contains implementations of the commands supported by
//! the CLI application using the Command pattern.

pub mod command_traits;
pub mod extract_command;
pub mod info_command;

pub use command_traits::{Command, CommandFactory};
pub use extract_command::ExtractCommand;
pub use info_command::InfoCommand;

use clap::ArgMatches;

use crate::tiff::errors::TiffResult;

/// Factory for creating command instances based on CLI arguments
pub struct StacktiffCommandFactory;

impl StacktiffCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        StacktiffCommandFactory
    }
}

impl Default for StacktiffCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for StacktiffCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> TiffResult<Box<dyn Command>> {
        if args.get_flag("extract") {
            Ok(Box::new(ExtractCommand::new(args)?))
        } else {
            // Default to the info command
            Ok(Box::new(InfoCommand::new(args)?))
        }
    }
}
