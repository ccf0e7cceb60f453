//! HIPS validation utilities
//!
//! This module provides validation functions for HIPS files
//! to ensure data integrity and prevent reads outside the stream
//! when processing potentially malformed files.

use log::warn;
use std::io::{Seek, SeekFrom};

use crate::hips::errors::{HipsError, HipsResult};
use crate::io::seekable::SeekableReader;

/// Gets the stream size for validation purposes
///
/// The current position is restored afterwards.
///
/// # Arguments
/// * `reader` - The seekable reader to use
///
/// # Returns
/// The stream size or u64::MAX if it couldn't be determined
pub fn get_stream_size(reader: &mut dyn SeekableReader) -> HipsResult<u64> {
    let current_position = reader.stream_position()?;
    let stream_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not determine stream size: {}", e);
            u64::MAX
        }
    };
    reader.seek(SeekFrom::Start(current_position))?;

    Ok(stream_size)
}

/// Validates that `[offset, offset + len)` lies inside a window of `window_len` bytes
///
/// # Arguments
/// * `offset` - Start of the range relative to the window
/// * `len` - Length of the range
/// * `window_len` - Size of the window
/// * `error_offset` - Absolute offset reported on failure
/// * `what` - Name of the value being read
pub fn validate_range(offset: u64, len: u64, window_len: u64, error_offset: u64, what: &str) -> HipsResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= window_len => Ok(()),
        _ => Err(HipsError::truncated(
            error_offset,
            format!("{} spans bytes {}..{}+{} outside a section of {} bytes", what, offset, offset, len, window_len),
        )),
    }
}

/// Validates the geometry needed to lay out band planes
pub fn validate_geometry(height: u64, width: u64, offset: u64) -> HipsResult<()> {
    if height == 0 || width == 0 {
        return Err(HipsError::format(
            offset,
            format!("image geometry {}x{} has no pixels", width, height),
        ));
    }
    Ok(())
}
