//! Compression handling for HIPS band chunks
//!
//! This module implements strategies for the chunk codecs and the named
//! compression presets.

mod handler;
mod mode;
mod raster;
mod deflate;
mod png;
mod jpeg;
mod factory;
mod preset;

pub use handler::{ChunkContext, CompressionHandler};
pub use mode::CompressionMode;
pub use deflate::DeflateHandler;
pub use png::PngHandler;
pub use jpeg::JpegHandler;
pub use factory::CompressionFactory;
pub use preset::{CompressionPreset, PresetSettings};
