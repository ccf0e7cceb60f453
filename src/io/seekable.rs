//! Seekable reader trait and implementations
//!
//! This module provides a unified trait for buffered readers that support
//! both line-oriented reading and seeking. The HIPS header is text and the
//! payload is binary, so the decoder needs both on the same stream.

use std::io::{BufRead, Seek};

/// Trait for readers that can read lines, peek and seek
///
/// This trait combines the BufRead and Seek traits for use with
/// the HIPS header and payload readers.
pub trait SeekableReader: BufRead + Seek {}

// Blanket implementation for any type that implements the required traits
impl<T: BufRead + Seek> SeekableReader for T {}
