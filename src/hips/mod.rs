//! HIPS file format parsing module
//!
//! This module provides the structures and functions for reading and
//! writing HIPS hyperspectral image files.

pub mod constants;
pub mod definitions;
pub mod errors;
pub mod header;
pub mod image;
pub mod params;
pub mod pixel_format;
pub mod quantification;
pub mod reader;
pub mod types;
pub(crate) mod validation;
pub mod writer;
#[cfg(test)]
mod tests;

pub use errors::{HipsError, HipsResult, MetadataWarning};
pub use header::{HipsHeader, Roi};
pub use image::HipsImage;
pub use params::{ExtendedParam, ExtendedParams, ParamFormat, ParamValue, ParamVector};
pub use pixel_format::{PixelFormat, SampleType};
pub use quantification::{QuantParams, QuantTable};
pub use reader::HipsReader;
pub use types::{BandPlane, PixelBuffer, PixelData};
pub use writer::HipsWriter;
