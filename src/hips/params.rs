//! Extended parameter table
//!
//! After the header comes a declaration table of named metadata values.
//! Single values are written inline on their declaration line; vectors are
//! stored in a binary section that follows the table and are referenced by
//! byte offset. Reading happens in two phases: declarations first, then
//! every deferred vector is resolved against the binary section.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::io::{SeekFrom, Write};

use crate::hips::constants::{NEWLINE, SPACE};
use crate::hips::definitions;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::validation;
use crate::io::byte_order::{decode_samples, encode_samples};
use crate::io::line_reader;
use crate::io::seekable::SeekableReader;

/// Format character of a parameter declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamFormat {
    /// `c`: characters, vectors decode to text
    Char,
    /// `b`: unsigned bytes
    Byte,
    /// `s`: 16-bit signed integers
    Short,
    /// `i`: 32-bit signed integers
    Int,
    /// `f`: 32-bit floats
    Float,
    /// `d`: 64-bit floats
    Double,
    /// Any other character; vectors are read as bytes
    Other(char),
}

impl ParamFormat {
    pub fn from_char(c: char) -> Self {
        match c {
            'c' => ParamFormat::Char,
            'b' => ParamFormat::Byte,
            's' => ParamFormat::Short,
            'i' => ParamFormat::Int,
            'f' => ParamFormat::Float,
            'd' => ParamFormat::Double,
            other => ParamFormat::Other(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            ParamFormat::Char => 'c',
            ParamFormat::Byte => 'b',
            ParamFormat::Short => 's',
            ParamFormat::Int => 'i',
            ParamFormat::Float => 'f',
            ParamFormat::Double => 'd',
            ParamFormat::Other(c) => *c,
        }
    }

    /// Bytes per element in the binary section
    pub fn item_size(&self) -> u64 {
        match self {
            ParamFormat::Char | ParamFormat::Byte | ParamFormat::Other(_) => 1,
            ParamFormat::Short => 2,
            ParamFormat::Int | ParamFormat::Float => 4,
            ParamFormat::Double => 8,
        }
    }

    /// Name from the definitions table
    pub fn name(&self) -> String {
        definitions::parameter_format_name(self.as_char())
    }
}

/// Resolved numeric vector of a deferred parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamVector {
    Bytes(Vec<u8>),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
}

impl ParamVector {
    pub fn len(&self) -> usize {
        match self {
            ParamVector::Bytes(v) => v.len(),
            ParamVector::Shorts(v) => v.len(),
            ParamVector::Ints(v) => v.len(),
            ParamVector::Floats(v) => v.len(),
            ParamVector::Doubles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The declaration format matching this element type
    pub fn natural_format(&self) -> ParamFormat {
        match self {
            ParamVector::Bytes(_) => ParamFormat::Byte,
            ParamVector::Shorts(_) => ParamFormat::Short,
            ParamVector::Ints(_) => ParamFormat::Int,
            ParamVector::Floats(_) => ParamFormat::Float,
            ParamVector::Doubles(_) => ParamFormat::Double,
        }
    }

    /// Values widened to f64
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            ParamVector::Bytes(v) => v.iter().map(|&x| x as f64).collect(),
            ParamVector::Shorts(v) => v.iter().map(|&x| x as f64).collect(),
            ParamVector::Ints(v) => v.iter().map(|&x| x as f64).collect(),
            ParamVector::Floats(v) => v.iter().map(|&x| x as f64).collect(),
            ParamVector::Doubles(v) => v.clone(),
        }
    }

    /// Keeps the listed elements in the given order; out-of-range indexes are skipped
    pub fn select(&self, indexes: &[usize]) -> ParamVector {
        fn pick<T: Copy>(values: &[T], indexes: &[usize]) -> Vec<T> {
            indexes.iter().filter_map(|&i| values.get(i).copied()).collect()
        }
        match self {
            ParamVector::Bytes(v) => ParamVector::Bytes(pick(v, indexes)),
            ParamVector::Shorts(v) => ParamVector::Shorts(pick(v, indexes)),
            ParamVector::Ints(v) => ParamVector::Ints(pick(v, indexes)),
            ParamVector::Floats(v) => ParamVector::Floats(pick(v, indexes)),
            ParamVector::Doubles(v) => ParamVector::Doubles(pick(v, indexes)),
        }
    }

    fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            ParamVector::Bytes(v) => v.clone(),
            ParamVector::Shorts(v) => encode_samples(v),
            ParamVector::Ints(v) => encode_samples(v),
            ParamVector::Floats(v) => encode_samples(v),
            ParamVector::Doubles(v) => encode_samples(v),
        }
    }
}

/// Value of an extended parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Inline `b`, `s` or `i` value
    Integer(i64),
    /// Inline `f` or `d` value
    Float(f64),
    /// Inline value of any other format, or a resolved `c` vector
    Text(String),
    /// Resolved numeric vector
    Vector(ParamVector),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{:?}", s),
            ParamValue::Vector(v) => {
                let values = v.to_f64();
                let preview: Vec<String> = values.iter().take(8).map(|x| x.to_string()).collect();
                write!(f, "[{}{}]", preview.join(", "), if values.len() > 8 { ", ..." } else { "" })
            }
        }
    }
}

/// One named entry of the extended parameter table
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedParam {
    pub name: String,
    pub format: ParamFormat,
    pub value: ParamValue,
}

impl ExtendedParam {
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        ExtendedParam { name: name.into(), format: ParamFormat::Int, value: ParamValue::Integer(value) }
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        ExtendedParam { name: name.into(), format: ParamFormat::Double, value: ParamValue::Float(value) }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        ExtendedParam { name: name.into(), format: ParamFormat::Char, value: ParamValue::Text(value.into()) }
    }

    pub fn vector(name: impl Into<String>, value: ParamVector) -> Self {
        ExtendedParam { name: name.into(), format: value.natural_format(), value: ParamValue::Vector(value) }
    }
}

/// A vector declaration waiting for the binary section
#[derive(Debug)]
struct DeferredParam {
    name: String,
    format: ParamFormat,
    count: u64,
    offset: u64,
    /// Offset of the declaration line, reported on errors
    line_offset: u64,
}

/// Ordered table of extended parameters with unique names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedParams {
    params: Vec<ExtendedParam>,
    index: HashMap<String, usize>,
}

impl ExtendedParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter; an existing one with the same name is replaced in place
    pub fn insert(&mut self, param: ExtendedParam) {
        match self.index.get(&param.name) {
            Some(&i) => self.params[i] = param,
            None => {
                self.index.insert(param.name.clone(), self.params.len());
                self.params.push(param);
            }
        }
    }

    /// Removes a parameter by name
    pub fn remove(&mut self, name: &str) -> Option<ExtendedParam> {
        let position = self.index.remove(name)?;
        let removed = self.params.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&ExtendedParam> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Text value of a parameter, if it is text
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match &self.get(name)?.value {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value of a parameter, if it is an integer scalar
    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self.get(name)?.value {
            ParamValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric values as f64; a scalar becomes a one-element vector
    pub fn get_values(&self, name: &str) -> Option<Vec<f64>> {
        match &self.get(name)?.value {
            ParamValue::Integer(v) => Some(vec![*v as f64]),
            ParamValue::Float(v) => Some(vec![*v]),
            ParamValue::Vector(v) => Some(v.to_f64()),
            ParamValue::Text(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtendedParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Reads the declaration table and resolves deferred vectors
    ///
    /// On success the reader is positioned at `binary_base + binary_size`,
    /// the first byte of the pixel payload.
    pub fn read(reader: &mut dyn SeekableReader) -> HipsResult<Self> {
        let num_params = line_reader::read_count_line(reader, "parameter count")?;
        debug!("Reading {} extended parameter declarations", num_params);

        let mut declarations = Vec::new();
        for i in 0..num_params {
            let (line_offset, line) = line_reader::read_line(reader, &format!("parameter declaration {}", i))?;
            declarations.push(parse_declaration(&line, line_offset)?);
        }

        let binary_size = line_reader::read_count_line(reader, "binary section size")?;
        line_reader::skip_run(reader, SPACE)?;
        line_reader::skip_byte_if(reader, NEWLINE)?;
        let binary_base = line_reader::position(reader)?;

        let remaining = line_reader::remaining_bytes(reader)?;
        if binary_size > remaining {
            return Err(HipsError::truncated(
                binary_base,
                format!("binary section declares {} bytes but only {} remain", binary_size, remaining),
            ));
        }

        let mut table = ExtendedParams::new();
        for declaration in declarations {
            match declaration {
                Declaration::Inline(param) => table.insert(param),
                Declaration::Deferred(param) => {
                    let value = resolve_deferred(reader, &param, binary_base, binary_size)?;
                    table.insert(ExtendedParam { name: param.name, format: param.format, value });
                }
            }
        }

        reader.seek(SeekFrom::Start(binary_base + binary_size))?;
        info!("Read {} extended parameters ({} byte binary section)", table.len(), binary_size);
        Ok(table)
    }

    /// Writes the declaration table followed by the binary section
    ///
    /// Vectors are packed back to back in declaration order. The size line
    /// is followed by an extra newline so a binary section starting with a
    /// space or newline byte is not swallowed by the reader's padding skip.
    pub fn write_to(&self, writer: &mut impl Write) -> HipsResult<()> {
        let mut declarations = Vec::with_capacity(self.params.len());
        let mut binary = Vec::new();

        for param in &self.params {
            validate_name(&param.name)?;
            let fmt_char = param.format.as_char();
            let line = match &param.value {
                ParamValue::Integer(v) => format!("{} {} 1 {}", param.name, fmt_char, v),
                ParamValue::Float(v) => format!("{} {} 1 {}", param.name, fmt_char, v),
                ParamValue::Text(text) => {
                    let inline = param.format != ParamFormat::Char || text.chars().count() == 1;
                    if inline {
                        validate_inline_text(&param.name, text)?;
                        format!("{} {} 1 {}", param.name, fmt_char, text)
                    } else {
                        let offset = binary.len();
                        binary.extend_from_slice(text.as_bytes());
                        format!("{} {} {} {}", param.name, fmt_char, text.len(), offset)
                    }
                }
                ParamValue::Vector(vector) => {
                    if param.format.item_size() as usize != vector.natural_format().item_size() as usize {
                        return Err(HipsError::GenericError(format!(
                            "Parameter {} declares format '{}' but holds {:?} values",
                            param.name, fmt_char, vector.natural_format()
                        )));
                    }
                    if vector.len() == 1 {
                        format!("{} {} 1 {}", param.name, fmt_char, vector.to_f64()[0])
                    } else {
                        let offset = binary.len();
                        binary.extend_from_slice(&vector.to_le_bytes());
                        format!("{} {} {} {}", param.name, fmt_char, vector.len(), offset)
                    }
                }
            };
            declarations.push(line);
        }

        writeln!(writer, "{}", declarations.len())?;
        for line in &declarations {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer, "{}", binary.len())?;
        writer.write_all(&[NEWLINE])?;
        writer.write_all(&binary)?;
        Ok(())
    }
}

enum Declaration {
    Inline(ExtendedParam),
    Deferred(DeferredParam),
}

/// Splits a declaration into at most four tokens
///
/// The fourth token is the rest of the line, so inline text values may
/// contain spaces.
fn split_declaration(line: &str) -> Vec<&str> {
    let mut tokens = Vec::with_capacity(4);
    let mut rest = line.trim_start();
    while tokens.len() < 3 && !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        tokens.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    if !rest.is_empty() {
        tokens.push(rest.trim_end());
    }
    tokens
}

fn parse_declaration(line: &str, line_offset: u64) -> HipsResult<Declaration> {
    let tokens = split_declaration(line);
    if tokens.len() < 3 {
        return Err(HipsError::format(line_offset, format!("incomplete parameter declaration '{}'", line)));
    }

    let name = tokens[0].to_string();
    let format = tokens[1].chars().next()
        .map(ParamFormat::from_char)
        .ok_or_else(|| HipsError::format(line_offset, "missing parameter format"))?;
    let count = tokens[2].parse::<i64>()
        .ok()
        .filter(|c| *c >= 0)
        .ok_or_else(|| HipsError::format(line_offset, format!("invalid count '{}' for parameter {}", tokens[2], name)))?;
    let value_token = tokens.get(3).copied().unwrap_or("");

    if count == 1 {
        let value = parse_scalar(format, value_token)
            .ok_or_else(|| HipsError::format(
                line_offset,
                format!("invalid {} value '{}' for parameter {}", format.name(), value_token, name),
            ))?;
        return Ok(Declaration::Inline(ExtendedParam { name, format, value }));
    }

    let offset = value_token.parse::<u64>()
        .map_err(|_| HipsError::format(line_offset, format!("invalid offset '{}' for parameter {}", value_token, name)))?;
    if let ParamFormat::Other(c) = format {
        warn!("Parameter {} uses unknown format '{}', reading it as bytes", name, c);
    }
    Ok(Declaration::Deferred(DeferredParam { name, format, count: count as u64, offset, line_offset }))
}

fn parse_scalar(format: ParamFormat, token: &str) -> Option<ParamValue> {
    match format {
        ParamFormat::Byte | ParamFormat::Short | ParamFormat::Int => token.parse().ok().map(ParamValue::Integer),
        ParamFormat::Float | ParamFormat::Double => token.parse().ok().map(ParamValue::Float),
        ParamFormat::Char | ParamFormat::Other(_) => Some(ParamValue::Text(token.to_string())),
    }
}

fn resolve_deferred(
    reader: &mut dyn SeekableReader,
    param: &DeferredParam,
    binary_base: u64,
    binary_size: u64,
) -> HipsResult<ParamValue> {
    let len = param.count.checked_mul(param.format.item_size())
        .ok_or_else(|| HipsError::truncated(param.line_offset, format!("parameter {} is too large", param.name)))?;
    validation::validate_range(param.offset, len, binary_size, param.line_offset, &param.name)?;

    let start = binary_base + param.offset;
    reader.seek(SeekFrom::Start(start))?;
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)
        .map_err(|e| HipsError::from_read(e, start, &param.name))?;
    debug!("Resolved parameter {} ({} x '{}') at binary offset {}",
           param.name, param.count, param.format.as_char(), param.offset);

    let value = match param.format {
        ParamFormat::Char => ParamValue::Text(decode_ascii(&param.name, bytes)),
        ParamFormat::Byte | ParamFormat::Other(_) => ParamValue::Vector(ParamVector::Bytes(bytes)),
        ParamFormat::Short => ParamValue::Vector(ParamVector::Shorts(decode_samples(&bytes))),
        ParamFormat::Int => ParamValue::Vector(ParamVector::Ints(decode_samples(&bytes))),
        ParamFormat::Float => ParamValue::Vector(ParamVector::Floats(decode_samples(&bytes))),
        ParamFormat::Double => ParamValue::Vector(ParamVector::Doubles(decode_samples(&bytes))),
    };
    Ok(value)
}

fn decode_ascii(name: &str, bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        warn!("Parameter {} is not valid ASCII, replacing invalid bytes", name);
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}

fn validate_name(name: &str) -> HipsResult<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(HipsError::GenericError(format!("Invalid parameter name {:?}", name)));
    }
    Ok(())
}

fn validate_inline_text(name: &str, text: &str) -> HipsResult<()> {
    if text.contains('\n') || text.trim() != text || text.is_empty() {
        return Err(HipsError::GenericError(format!(
            "Parameter {} value {:?} cannot be written inline", name, text
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_declaration_keeps_text_remainder() {
        std::assert_eq!(split_declaration("Name c 1 two words"), vec!["Name", "c", "1", "two words"]);
        std::assert_eq!(split_declaration("  Mm  f   1  0.5 "), vec!["Mm", "f", "1", "0.5"]);
        std::assert_eq!(split_declaration("Empty i 0"), vec!["Empty", "i", "0"]);
    }

    #[test]
    fn test_scalar_parsing_by_format() {
        std::assert_eq!(parse_scalar(ParamFormat::Short, "-4"), Some(ParamValue::Integer(-4)));
        std::assert_eq!(parse_scalar(ParamFormat::Double, "2.5"), Some(ParamValue::Float(2.5)));
        std::assert_eq!(parse_scalar(ParamFormat::Other('x'), "abc"), Some(ParamValue::Text("abc".to_string())));
        std::assert_eq!(parse_scalar(ParamFormat::Int, "abc"), None);
    }

    #[test]
    fn test_insert_replaces_and_remove_reindexes() {
        let mut params = ExtendedParams::new();
        params.insert(ExtendedParam::integer("A", 1));
        params.insert(ExtendedParam::integer("B", 2));
        params.insert(ExtendedParam::integer("C", 3));
        params.insert(ExtendedParam::integer("A", 10));
        std::assert_eq!(params.len(), 3);
        std::assert_eq!(params.get_integer("A"), Some(10));

        params.remove("A");
        std::assert_eq!(params.get_integer("C"), Some(3));
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        std::assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_vector_format_mismatch_is_rejected_on_write() {
        let mut params = ExtendedParams::new();
        params.insert(ExtendedParam {
            name: "Bad".to_string(),
            format: ParamFormat::Double,
            value: ParamValue::Vector(ParamVector::Ints(vec![1, 2])),
        });
        let mut out = Vec::new();
        std::assert!(params.write_to(&mut out).is_err());
    }
}
