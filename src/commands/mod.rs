//! hipskit CLI commands
//!
//! One command per mode of the binary: analyze (the default), extract and
//! convert. `HipskitCommandFactory` picks one from the parsed flags.

pub mod command_traits;
pub mod analyze_command;
pub mod extract_command;
pub mod convert_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use extract_command::ExtractCommand;
pub use convert_command::ConvertCommand;

use clap::ArgMatches;
use crate::utils::logger::Logger;
use crate::hips::errors::HipsResult;

/// Chooses the command for a set of parsed flags
pub struct HipskitCommandFactory;

impl HipskitCommandFactory {
    pub fn new() -> Self {
        HipskitCommandFactory
    }
}

impl Default for HipskitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for HipskitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> HipsResult<Box<dyn Command + 'a>> {
        let command: Box<dyn Command + 'a> = if args.get_flag("extract") {
            Box::new(ExtractCommand::new(args, logger)?)
        } else if args.get_flag("convert") {
            Box::new(ConvertCommand::new(args, logger)?)
        } else {
            Box::new(AnalyzeCommand::new(args, logger)?)
        };
        Ok(command)
    }
}
