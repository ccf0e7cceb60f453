//! I/O utilities for HIPS streams
//!
//! This module provides traits and helpers for reading the text preamble
//! and the little-endian binary sections of a HIPS file.

pub mod seekable;
pub mod byte_order;
pub mod line_reader;
