//! Core HIPS pixel data structures
//!
//! A decoded image is a band-major 3-D array `(band, row, column)`. A single
//! decoded band is the 2-D counterpart. Both share one enum over the
//! supported element types so codecs can hand planes around without
//! committing to a type up front.

use ndarray::{Array, Array2, Array3, ArrayView, Axis, Dimension, Ix2, Ix3};

use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::pixel_format::SampleType;
use crate::io::byte_order::{decode_samples, encode_samples, Sample};

/// Typed pixel array of any dimensionality
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData<D: Dimension> {
    U8(Array<u8, D>),
    U16(Array<u16, D>),
    U32(Array<u32, D>),
    F32(Array<f32, D>),
    F64(Array<f64, D>),
}

/// Band-major image buffer `(band, row, column)`
pub type PixelBuffer = PixelData<Ix3>;

/// One decoded band `(row, column)`
pub type BandPlane = PixelData<Ix2>;

// Applies the same expression to whichever array the enum holds
macro_rules! with_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            PixelData::U8($arr) => $body,
            PixelData::U16($arr) => $body,
            PixelData::U32($arr) => $body,
            PixelData::F32($arr) => $body,
            PixelData::F64($arr) => $body,
        }
    };
}

// Same as `with_array!` but rewraps the result in the matching variant
macro_rules! map_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            PixelData::U8($arr) => PixelData::U8($body),
            PixelData::U16($arr) => PixelData::U16($body),
            PixelData::U32($arr) => PixelData::U32($body),
            PixelData::F32($arr) => PixelData::F32($body),
            PixelData::F64($arr) => PixelData::F64($body),
        }
    };
}

fn finite_bounds<T: Sample, D: Dimension>(array: &Array<T, D>) -> Option<(f64, f64)> {
    array.iter()
        .map(|v| v.to_f64())
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn to_bytes<T: Sample, D: Dimension>(array: &Array<T, D>) -> Vec<u8> {
    match array.as_slice() {
        Some(values) => encode_samples(values),
        None => {
            let values: Vec<T> = array.iter().copied().collect();
            encode_samples(&values)
        }
    }
}

impl<D: Dimension> PixelData<D> {
    /// Element type held by this array
    pub fn sample_type(&self) -> SampleType {
        match self {
            PixelData::U8(_) => SampleType::U8,
            PixelData::U16(_) => SampleType::U16,
            PixelData::U32(_) => SampleType::U32,
            PixelData::F32(_) => SampleType::F32,
            PixelData::F64(_) => SampleType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        with_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts every element to f32
    pub fn to_f32(&self) -> Array<f32, D> {
        match self {
            PixelData::U8(a) => a.mapv(|v| v as f32),
            PixelData::U16(a) => a.mapv(|v| v as f32),
            PixelData::U32(a) => a.mapv(|v| v as f32),
            PixelData::F32(a) => a.clone(),
            PixelData::F64(a) => a.mapv(|v| v as f32),
        }
    }

    /// Converts every element to f64
    pub fn to_f64(&self) -> Array<f64, D> {
        with_array!(self, a => a.mapv(|v| v.to_f64()))
    }

    /// Smallest and largest finite value, or None if there is none
    pub fn min_max(&self) -> Option<(f64, f64)> {
        with_array!(self, a => finite_bounds(a))
    }

    /// Little-endian bytes in logical (row-major) order
    pub fn to_le_bytes(&self) -> Vec<u8> {
        with_array!(self, a => to_bytes(a))
    }
}

impl BandPlane {
    /// Builds a `(height, width)` plane from little-endian bytes
    ///
    /// Returns None if `bytes` does not hold exactly `height * width` samples.
    pub fn from_le_bytes(sample_type: SampleType, height: usize, width: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != height.checked_mul(width)?.checked_mul(sample_type.size())? {
            return None;
        }
        let shape = (height, width);
        let plane = match sample_type {
            SampleType::U8 => BandPlane::U8(Array2::from_shape_vec(shape, bytes.to_vec()).ok()?),
            SampleType::U16 => BandPlane::U16(Array2::from_shape_vec(shape, decode_samples(bytes)).ok()?),
            SampleType::U32 => BandPlane::U32(Array2::from_shape_vec(shape, decode_samples(bytes)).ok()?),
            SampleType::F32 => BandPlane::F32(Array2::from_shape_vec(shape, decode_samples(bytes)).ok()?),
            SampleType::F64 => BandPlane::F64(Array2::from_shape_vec(shape, decode_samples(bytes)).ok()?),
        };
        Some(plane)
    }

    pub fn height(&self) -> usize {
        self.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.shape()[1]
    }
}

fn stack_planes<T: Clone>(planes: Vec<ArrayView<'_, T, Ix2>>) -> HipsResult<Array3<T>> {
    ndarray::stack(Axis(0), &planes)
        .map_err(|e| HipsError::GenericError(format!("Band planes do not share one shape: {}", e)))
}

impl PixelBuffer {
    pub fn bands(&self) -> usize {
        self.shape()[0]
    }

    pub fn height(&self) -> usize {
        self.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.shape()[2]
    }

    /// Copy of one band, or None if out of range
    pub fn band(&self, index: usize) -> Option<BandPlane> {
        if index >= self.bands() {
            return None;
        }
        Some(map_array!(self, a => a.index_axis(Axis(0), index).to_owned()))
    }

    /// All bands as separate planes, in order
    pub fn planes(&self) -> Vec<BandPlane> {
        (0..self.bands()).filter_map(|i| self.band(i)).collect()
    }

    /// New buffer holding the listed bands in the given order
    ///
    /// Indexes must already be validated against `bands()`.
    pub fn select_bands(&self, indexes: &[usize]) -> PixelBuffer {
        map_array!(self, a => a.select(Axis(0), indexes))
    }

    /// Stacks band planes into a buffer
    ///
    /// Planes sharing one element type keep it; mixed element types are
    /// promoted to f32.
    pub fn from_bands(planes: Vec<BandPlane>) -> HipsResult<Self> {
        let Some(first) = planes.first() else {
            return Err(HipsError::GenericError("Cannot build a pixel buffer without bands".to_string()));
        };
        let sample_type = first.sample_type();
        let uniform = planes.iter().all(|p| p.sample_type() == sample_type);

        if !uniform {
            let converted: Vec<Array2<f32>> = planes.iter().map(|p| p.to_f32()).collect();
            let views = converted.iter().map(|a| a.view()).collect();
            return Ok(PixelBuffer::F32(stack_planes(views)?));
        }

        let buffer = match sample_type {
            SampleType::U8 => PixelBuffer::U8(stack_planes(planes.iter().filter_map(|p| match p {
                BandPlane::U8(a) => Some(a.view()),
                _ => None,
            }).collect())?),
            SampleType::U16 => PixelBuffer::U16(stack_planes(planes.iter().filter_map(|p| match p {
                BandPlane::U16(a) => Some(a.view()),
                _ => None,
            }).collect())?),
            SampleType::U32 => PixelBuffer::U32(stack_planes(planes.iter().filter_map(|p| match p {
                BandPlane::U32(a) => Some(a.view()),
                _ => None,
            }).collect())?),
            SampleType::F32 => PixelBuffer::F32(stack_planes(planes.iter().filter_map(|p| match p {
                BandPlane::F32(a) => Some(a.view()),
                _ => None,
            }).collect())?),
            SampleType::F64 => PixelBuffer::F64(stack_planes(planes.iter().filter_map(|p| match p {
                BandPlane::F64(a) => Some(a.view()),
                _ => None,
            }).collect())?),
        };
        Ok(buffer)
    }
}
