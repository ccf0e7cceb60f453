//! HIPS structure analysis command
//!
//! Prints the header, the extended parameter table, the quantification
//! table and a payload summary of a HIPS file.

use clap::ArgMatches;
use log::{debug, info, warn};

use crate::api;
use crate::commands::command_traits::{self, Command};
use crate::hips::errors::HipsResult;
use crate::hips::image::HipsImage;
use crate::hips::params::ParamValue;
use crate::utils::logger::Logger;

/// Command for analyzing HIPS file structure
pub struct AnalyzeCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Whether to print every parameter value in full
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> AnalyzeCommand<'a> {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new AnalyzeCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> HipsResult<Self> {
        Ok(AnalyzeCommand {
            input_file: command_traits::input_path(args)?,
            verbose: args.get_flag("verbose"),
            logger,
        })
    }

    fn display_parameters(&self, image: &HipsImage) {
        info!("Extended parameters ({}):", image.params.len());
        for param in image.params.iter() {
            match &param.value {
                ParamValue::Vector(vector) if self.verbose => {
                    info!("  {} ({}, {} values): {:?}", param.name, param.format.name(), vector.len(), vector.to_f64());
                }
                ParamValue::Text(text) if !self.verbose && text.len() > 80 => {
                    info!("  {} ({}): {} characters", param.name, param.format.name(), text.len());
                }
                value => info!("  {} ({}): {}", param.name, param.format.name(), value),
            }
        }
    }

    fn display_quantification(&self, image: &HipsImage) {
        if image.quantification.is_empty() {
            info!("Quantification: none");
            return;
        }
        info!("Quantification ({} bands):", image.quantification.len());
        for (band, params) in image.quantification.iter().enumerate() {
            info!("  Band {}: {}", band, params);
        }
    }

    fn display_payload(&self, image: &HipsImage) {
        info!("Payload: {} bands of {}x{} {}",
              image.pixels.bands(), image.pixels.width(), image.pixels.height(), image.pixels.sample_type());
        for (band, mode) in image.band_modes.iter().enumerate() {
            debug!("  Band {}: {}", band, mode);
        }
        if let Some((lo, hi)) = image.pixels.min_max() {
            info!("  Value range: [{}, {}]", lo, hi);
        }
    }
}

impl<'a> Command for AnalyzeCommand<'a> {
    fn execute(&self) -> HipsResult<()> {
        info!("Analyzing HIPS file: {}", self.input_file);
        let image = api::read_file(&self.input_file, None)?;

        info!("{}", image.header);
        self.display_parameters(&image);
        self.display_quantification(&image);
        self.display_payload(&image);
        for warning in &image.warnings {
            warn!("{}", warning);
        }

        self.logger.log(&format!("Analyzed {}", self.input_file))?;
        Ok(())
    }
}
