//! HIPS code table definitions
//!
//! Names for pixel format codes and parameter format characters, the list
//! of per-band parameters and the compression presets are kept in an
//! embedded TOML table and parsed once on first use.

use std::collections::HashMap;
use lazy_static::lazy_static;
use crate::hips::errors::{HipsError, HipsResult};

lazy_static! {
    // Parse the embedded table on first use
    static ref HIPS_DEFINITIONS: HipsDefinitions = {
        let content = include_str!("../../hips_formats.toml");
        HipsDefinitions::from_str(content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse HIPS definitions: {}", e);
                HipsDefinitions::default()
            })
    };
}

/// A compression preset as written in the definitions table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDefinition {
    /// Compression mode name ("raw", "deflate", "png", "jpeg")
    pub mode: String,
    /// Quantification bit depth, absent for raw payloads
    pub bits: Option<u8>,
}

/// Container for HIPS code tables
#[derive(Debug, Default)]
pub struct HipsDefinitions {
    // Maps pixel format codes to names
    pub pixel_format_names: HashMap<u32, String>,
    // Maps parameter format characters to names
    pub parameter_format_names: HashMap<char, String>,
    // Parameters that hold one value per band
    pub per_band_parameters: Vec<String>,
    // Presets keyed by name
    pub presets: HashMap<String, PresetDefinition>,
}

impl HipsDefinitions {
    /// Parse definitions from a TOML string
    pub fn from_str(content: &str) -> HipsResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(HipsError::GenericError(format!("Failed to parse TOML: {}", e))),
        };

        let mut defs = HipsDefinitions::default();

        if let Some(table) = toml_value.get("pixel_formats").and_then(|v| v.as_table()) {
            for (k, v) in table {
                if let (Ok(code), Some(name)) = (k.parse::<u32>(), v.as_str()) {
                    defs.pixel_format_names.insert(code, name.to_string());
                }
            }
        }

        if let Some(table) = toml_value.get("parameter_formats").and_then(|v| v.as_table()) {
            for (k, v) in table {
                if let (Some(c), Some(name)) = (k.chars().next(), v.as_str()) {
                    defs.parameter_format_names.insert(c, name.to_string());
                }
            }
        }

        if let Some(list) = toml_value.get("per_band")
            .and_then(|v| v.get("parameters"))
            .and_then(|v| v.as_array())
        {
            defs.per_band_parameters = list.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }

        if let Some(table) = toml_value.get("presets").and_then(|v| v.as_table()) {
            for (name, entry) in table {
                let Some(mode) = entry.get("mode").and_then(|v| v.as_str()) else {
                    continue;
                };
                let bits = entry.get("bits")
                    .and_then(|v| v.as_integer())
                    .and_then(|b| u8::try_from(b).ok());
                defs.presets.insert(name.clone(), PresetDefinition { mode: mode.to_string(), bits });
            }
        }

        Ok(defs)
    }
}

/// Get the name of a pixel format code
pub fn pixel_format_name(code: u32) -> String {
    HIPS_DEFINITIONS.pixel_format_names.get(&code)
        .cloned()
        .unwrap_or_else(|| format!("Unknown-{}", code))
}

/// Get the name of a parameter format character
pub fn parameter_format_name(format: char) -> String {
    HIPS_DEFINITIONS.parameter_format_names.get(&format)
        .cloned()
        .unwrap_or_else(|| format!("Unknown-{}", format))
}

/// Check whether a parameter holds one value per band
pub fn is_per_band_parameter(name: &str) -> bool {
    HIPS_DEFINITIONS.per_band_parameters.iter().any(|p| p == name)
}

/// Look up a compression preset by name (case-insensitive)
pub fn preset(name: &str) -> Option<PresetDefinition> {
    HIPS_DEFINITIONS.presets.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, def)| def.clone())
}

/// Names of all known presets, sorted
pub fn preset_names() -> Vec<String> {
    let mut names: Vec<String> = HIPS_DEFINITIONS.presets.keys().cloned().collect();
    names.sort();
    names
}
