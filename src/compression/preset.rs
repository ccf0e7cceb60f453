//! Named compression presets
//!
//! Presets pair a compression mode with a quantification bit depth. The
//! pairs live in the embedded definitions table.

use std::fmt;
use std::str::FromStr;

use crate::compression::mode::CompressionMode;
use crate::hips::definitions;
use crate::hips::errors::{HipsError, HipsResult};

/// Compression and quantification presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionPreset {
    Uncompressed,
    VeryHighQuality,
    HighQuality,
    HighCompression,
    VeryHighCompression,
}

/// What a preset resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSettings {
    pub mode: CompressionMode,
    /// Quantification bit depth, None for raw payloads
    pub bits: Option<u8>,
}

impl CompressionPreset {
    pub fn all() -> [CompressionPreset; 5] {
        [
            CompressionPreset::Uncompressed,
            CompressionPreset::VeryHighQuality,
            CompressionPreset::HighQuality,
            CompressionPreset::HighCompression,
            CompressionPreset::VeryHighCompression,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionPreset::Uncompressed => "Uncompressed",
            CompressionPreset::VeryHighQuality => "VeryHighQuality",
            CompressionPreset::HighQuality => "HighQuality",
            CompressionPreset::HighCompression => "HighCompression",
            CompressionPreset::VeryHighCompression => "VeryHighCompression",
        }
    }

    /// Mode and bit depth from the definitions table
    pub fn settings(&self) -> HipsResult<PresetSettings> {
        let definition = definitions::preset(self.name())
            .ok_or_else(|| HipsError::GenericError(format!("Preset {} is not defined", self.name())))?;
        let mode: CompressionMode = definition.mode.parse()?;
        if mode.is_chunked() && definition.bits.is_none() {
            return Err(HipsError::GenericError(format!(
                "Preset {} uses {} chunks but defines no bit depth", self.name(), mode
            )));
        }
        Ok(PresetSettings { mode, bits: definition.bits })
    }
}

impl fmt::Display for CompressionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CompressionPreset {
    type Err = HipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HipsError::GenericError(format!(
                "Unknown preset '{}', expected one of: {}", s, definitions::preset_names().join(", ")
            )))
    }
}
