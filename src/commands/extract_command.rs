//! Band extraction command
//!
//! Writes one band, or every band, of a HIPS file as CSV or as a
//! normalized grayscale PNG.

use clap::ArgMatches;
use log::info;

use crate::api::HipsKit;
use crate::commands::command_traits::{self, Command};
use crate::hips::errors::{HipsError, HipsResult};
use crate::utils::export_utils::ArrayFormat;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Command for extracting bands from HIPS files
pub struct ExtractCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file
    output_file: String,
    /// Single band to extract, all bands when absent
    band: Option<usize>,
    /// Band subset applied before extraction
    band_indexes: Option<Vec<usize>>,
    /// Format for array output
    array_format: ArrayFormat,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ExtractCommand<'a> {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new ExtractCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> HipsResult<Self> {
        let input_file = command_traits::input_path(args)?;
        let output_file = args.get_one::<String>("output")
            .ok_or_else(|| HipsError::GenericError("Missing output file path for extraction".to_string()))?
            .clone();

        let band = args.get_one::<String>("band")
            .map(|b| b.parse::<usize>()
                .map_err(|_| HipsError::GenericError(format!("Invalid band index: {}", b))))
            .transpose()?;

        let array_format = args.get_one::<String>("array-format")
            .map(|f| f.parse::<ArrayFormat>())
            .transpose()?
            .unwrap_or(ArrayFormat::Csv);

        info!("Extracting {} from {} to {} as {}",
              band.map(|b| format!("band {}", b)).unwrap_or_else(|| "all bands".to_string()),
              input_file, output_file, array_format);

        Ok(ExtractCommand {
            input_file,
            output_file,
            band,
            band_indexes: command_traits::band_list(args)?,
            array_format,
            logger,
        })
    }
}

impl<'a> Command for ExtractCommand<'a> {
    fn execute(&self) -> HipsResult<()> {
        let progress = ProgressTracker::new(0, "Extracting bands");
        let written = HipsKit::new().extract(
            &self.input_file,
            &self.output_file,
            self.band,
            self.array_format,
            self.band_indexes.as_deref(),
            &progress,
        )?;
        progress.finish();

        self.logger.record_outputs("extract", &written)?;
        info!("Extraction complete: {} file(s) written", written.len());
        Ok(())
    }
}
