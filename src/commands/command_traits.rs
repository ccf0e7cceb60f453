//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application.

use crate::hips::errors::{HipsError, HipsResult};
use crate::utils::logger::Logger;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> HipsResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory<'a> {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches, logger: &'a Logger) -> HipsResult<Box<dyn Command + 'a>>;
}

/// Reads the required input path argument
pub fn input_path(args: &clap::ArgMatches) -> HipsResult<String> {
    args.get_one::<String>("input")
        .cloned()
        .ok_or_else(|| HipsError::GenericError("Missing input file".to_string()))
}

/// Parses the optional `--bands` list, e.g. "0,2,5"
pub fn band_list(args: &clap::ArgMatches) -> HipsResult<Option<Vec<usize>>> {
    match args.get_one::<String>("bands") {
        Some(list) => parse_band_list(list).map(Some),
        None => Ok(None),
    }
}

/// Parses a comma separated list of band indexes
pub fn parse_band_list(list: &str) -> HipsResult<Vec<usize>> {
    let bands = list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>()
            .map_err(|_| HipsError::GenericError(format!("Invalid band index: {}", s))))
        .collect::<HipsResult<Vec<_>>>()?;
    if bands.is_empty() {
        return Err(HipsError::GenericError("Band list is empty".to_string()));
    }
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_band_list() {
        std::assert_eq!(parse_band_list("0, 2,5").unwrap(), vec![0, 2, 5]);
        std::assert!(parse_band_list("1,x").is_err());
        std::assert!(parse_band_list(" , ").is_err());
    }
}
