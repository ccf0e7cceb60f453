//! Text line helpers for the HIPS preamble
//!
//! The header and the parameter declarations are newline terminated UTF-8
//! lines interleaved with exact-length byte blocks. Each helper reports the
//! byte offset at which it started so errors can point into the file.

use crate::hips::errors::{HipsError, HipsResult};
use crate::io::seekable::SeekableReader;

/// Current stream position
pub fn position(reader: &mut dyn SeekableReader) -> HipsResult<u64> {
    Ok(reader.stream_position()?)
}

/// Reads one line and returns it trimmed, together with its start offset
///
/// A final line without a terminating newline is accepted. Reading at end of
/// stream is a truncation error naming `what`.
pub fn read_line(reader: &mut dyn SeekableReader, what: &str) -> HipsResult<(u64, String)> {
    let offset = position(reader)?;
    let mut buffer = Vec::new();
    let read = reader.read_until(b'\n', &mut buffer)
        .map_err(|e| HipsError::from_read(e, offset, what))?;

    if read == 0 {
        return Err(HipsError::truncated(offset, format!("missing {}", what)));
    }

    let text = String::from_utf8(buffer)
        .map_err(|_| HipsError::format(offset, format!("{} is not valid UTF-8", what)))?;

    Ok((offset, text.trim().to_string()))
}

/// Reads a line holding a single signed integer
pub fn read_int_line(reader: &mut dyn SeekableReader, what: &str) -> HipsResult<(u64, i64)> {
    let (offset, text) = read_line(reader, what)?;
    let value = text.parse::<i64>()
        .map_err(|_| HipsError::format(offset, format!("{} is not an integer: '{}'", what, text)))?;
    Ok((offset, value))
}

/// Reads a line holding an integer that must not be negative
pub fn read_count_line(reader: &mut dyn SeekableReader, what: &str) -> HipsResult<u64> {
    let (offset, value) = read_int_line(reader, what)?;
    if value < 0 {
        return Err(HipsError::format(offset, format!("{} must not be negative (got {})", what, value)));
    }
    Ok(value as u64)
}

/// Reads exactly `len` bytes
pub fn read_block(reader: &mut dyn SeekableReader, len: u64, what: &str) -> HipsResult<Vec<u8>> {
    let offset = position(reader)?;
    let remaining = remaining_bytes(reader)?;
    if len > remaining {
        return Err(HipsError::truncated(
            offset,
            format!("{} needs {} bytes but only {} remain", what, len, remaining),
        ));
    }
    read_checked_block(reader, offset, len, what)
}

/// Reads `len` bytes the caller has already checked against the stream end
///
/// `offset` is the current position, used only in error reports. Unlike
/// `read_block` this never seeks, so the reader's buffer is kept.
pub fn read_checked_block(reader: &mut dyn SeekableReader, offset: u64, len: u64, what: &str) -> HipsResult<Vec<u8>> {
    let mut buffer = vec![0u8; len as usize];
    reader.read_exact(&mut buffer)
        .map_err(|e| HipsError::from_read(e, offset, what))?;
    Ok(buffer)
}

/// Looks at the next byte without consuming it
pub fn peek_byte(reader: &mut dyn SeekableReader) -> HipsResult<Option<u8>> {
    let buffered = reader.fill_buf()?;
    Ok(buffered.first().copied())
}

/// Consumes the next byte if it equals `expected`
pub fn skip_byte_if(reader: &mut dyn SeekableReader, expected: u8) -> HipsResult<bool> {
    if peek_byte(reader)? == Some(expected) {
        reader.consume(1);
        return Ok(true);
    }
    Ok(false)
}

/// Consumes a run of `byte`, returning how many were skipped
pub fn skip_run(reader: &mut dyn SeekableReader, byte: u8) -> HipsResult<usize> {
    let mut skipped = 0;
    while skip_byte_if(reader, byte)? {
        skipped += 1;
    }
    Ok(skipped)
}

/// Bytes between the current position and the end of the stream
pub fn remaining_bytes(reader: &mut dyn SeekableReader) -> HipsResult<u64> {
    let current = position(reader)?;
    let total = crate::hips::validation::get_stream_size(reader)?;
    Ok(total.saturating_sub(current))
}
