//! Compression conversion command
//!
//! Re-encodes a HIPS file with another payload compression, either from an
//! explicit mode and bit depth or from a named preset.

use clap::ArgMatches;
use log::info;

use crate::api::HipsKit;
use crate::commands::command_traits::{self, Command};
use crate::compression::{CompressionMode, CompressionPreset};
use crate::hips::errors::{HipsError, HipsResult};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Command for converting HIPS payload compression
pub struct ConvertCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file
    output_file: String,
    /// Target compression mode
    mode: CompressionMode,
    /// Quantification bit depth for chunked output
    bits: Option<u8>,
    /// Band subset applied before conversion
    band_indexes: Option<Vec<usize>>,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ConvertCommand<'a> {
    /// Create a new convert command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new ConvertCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> HipsResult<Self> {
        let input_file = command_traits::input_path(args)?;
        let output_file = args.get_one::<String>("output")
            .ok_or_else(|| HipsError::GenericError("Missing output file path for conversion".to_string()))?
            .clone();

        // A preset wins over an explicit mode
        let (mode, bits) = if let Some(preset_name) = args.get_one::<String>("preset") {
            let preset: CompressionPreset = preset_name.parse()?;
            let settings = preset.settings()?;
            info!("Using preset {}", preset);
            (settings.mode, settings.bits)
        } else if let Some(mode_name) = args.get_one::<String>("mode") {
            let mode: CompressionMode = mode_name.parse()?;
            let bits = args.get_one::<String>("bits")
                .map(|b| b.parse::<u8>()
                    .map_err(|_| HipsError::GenericError(format!("Invalid bit depth: {}", b))))
                .transpose()?;
            (mode, bits)
        } else {
            return Err(HipsError::GenericError(
                "Missing compression specification. Use --mode or --preset".to_string(),
            ));
        };

        Ok(ConvertCommand {
            input_file,
            output_file,
            mode,
            bits,
            band_indexes: command_traits::band_list(args)?,
            logger,
        })
    }
}

impl<'a> Command for ConvertCommand<'a> {
    fn execute(&self) -> HipsResult<()> {
        info!("Converting {} to {} with {} compression{}",
              self.input_file, self.output_file, self.mode,
              self.bits.map(|b| format!(" ({} bits)", b)).unwrap_or_default());

        let progress = ProgressTracker::new(2, "Reading");
        HipsKit::new().convert(
            &self.input_file,
            &self.output_file,
            self.mode,
            self.bits,
            self.band_indexes.as_deref(),
            &progress,
        )?;
        progress.finish();

        self.logger.record_outputs("convert", &[self.output_file.clone()])?;
        info!("Conversion complete");
        Ok(())
    }
}
