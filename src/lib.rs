//! Reader and writer for HIPS hyperspectral image files
//!
//! A HIPS file is a text header, a table of named parameters with a binary
//! section for vector values, and a pixel payload that is either one raw
//! block or one compressed chunk per band.

pub mod io;
pub mod hips;
pub mod utils;
pub mod compression;
pub mod extractor;
pub mod commands;
pub mod api;

pub use crate::api::{decode, encode, read_file, read_pixel_values, write_file, write_file_with_preset, HipsKit};

pub use hips::{HipsError, HipsHeader, HipsImage, HipsReader, HipsResult, HipsWriter, MetadataWarning};
pub use hips::{ExtendedParam, ExtendedParams, PixelBuffer, PixelFormat, QuantParams, QuantTable};
pub use compression::{CompressionMode, CompressionPreset};
