//!
//! Decoded leaf values and the byte rules for turning them back into EBML
//! element data.
//!

use super::errors::ElementError;
use super::ids::ElementKind;
use super::tools::{arr_to_f64, arr_to_i64, arr_to_u64};

///
/// A float value together with the width it was (or will be) stored at.
///
/// EBML floats come in 4 and 8 byte forms.  The width is kept alongside the
/// value so an element read from a 4-byte field writes back as 4 bytes.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatData {
    pub value: f64,
    pub wide: bool,
}

impl From<f64> for FloatData {
    fn from(value: f64) -> Self {
        FloatData { value, wide: true }
    }
}

impl From<f32> for FloatData {
    fn from(value: f32) -> Self {
        FloatData { value: value as f64, wide: false }
    }
}

///
/// The decoded payload of a leaf element.
///
/// Containers never carry one of these - their content is their children.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ElementData {
    Uint(u64),
    Int(i64),
    Float(FloatData),
    Utf8(String),
    Binary(Vec<u8>),
    /// Nanosecond offset from the Matroska epoch (2001-01-01T00:00:00 UTC).
    Date(i64),
    SimpleBlock(Vec<u8>),
}

impl ElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementData::Uint(_) => ElementKind::Uint,
            ElementData::Int(_) => ElementKind::Int,
            ElementData::Float(_) => ElementKind::Float,
            ElementData::Utf8(_) => ElementKind::Utf8,
            ElementData::Binary(_) => ElementKind::Binary,
            ElementData::Date(_) => ElementKind::Date,
            ElementData::SimpleBlock(_) => ElementKind::SimpleBlock,
        }
    }
}

///
/// Decodes a leaf payload according to the kind its id maps to.
///
pub(crate) fn decode_value(kind: ElementKind, bytes: &[u8]) -> Result<ElementData, ElementError> {
    match kind {
        ElementKind::Uint => arr_to_u64(bytes)
            .map(ElementData::Uint)
            .map_err(|e| ElementError::UintParseError(e.to_string())),
        ElementKind::Int => arr_to_i64(bytes)
            .map(ElementData::Int)
            .map_err(|e| ElementError::IntParseError(e.to_string())),
        ElementKind::Float => arr_to_f64(bytes)
            .map(|value| ElementData::Float(FloatData { value, wide: bytes.len() == 8 }))
            .map_err(|e| ElementError::FloatParseError(e.to_string())),
        ElementKind::Utf8 => Ok(ElementData::Utf8(String::from_utf8(bytes.to_vec())?)),
        ElementKind::Date => arr_to_i64(bytes)
            .map(ElementData::Date)
            .map_err(|e| ElementError::IntParseError(e.to_string())),
        ElementKind::SimpleBlock => Ok(ElementData::SimpleBlock(bytes.to_vec())),
        // containers are never decoded; any other id is opaque binary
        ElementKind::Binary | ElementKind::Container => Ok(ElementData::Binary(bytes.to_vec())),
    }
}

///
/// Produces the payload bytes for a leaf value, using the minimal widths the
/// format calls for.
///
pub(crate) fn encode_value(data: &ElementData) -> Vec<u8> {
    match data {
        ElementData::Uint(value) => encode_uint(*value),
        ElementData::Int(value) => encode_int(*value),
        ElementData::Float(float) => {
            if float.wide {
                float.value.to_be_bytes().to_vec()
            } else {
                (float.value as f32).to_be_bytes().to_vec()
            }
        }
        ElementData::Utf8(text) => text.as_bytes().to_vec(),
        ElementData::Binary(bytes) => bytes.clone(),
        // dates are fixed-width 8 byte fields
        ElementData::Date(value) => value.to_be_bytes().to_vec(),
        ElementData::SimpleBlock(bytes) => bytes.clone(),
    }
}

///
/// Big-endian bytes of `value` with leading zero bytes stripped.  Zero still
/// occupies one byte.
///
pub(crate) fn encode_uint(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[first..].to_vec()
}

///
/// Minimal-width two's complement bytes of `value`.  A leading byte is
/// redundant only when it repeats the sign of the byte after it, so values
/// like `128` keep their `0x00` prefix and decode back to themselves.
///
pub(crate) fn encode_int(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut first = 0;
    while first < 7 {
        let sign_extension = if bytes[first + 1] & 0x80 == 0x80 { 0xFF } else { 0x00 };
        if bytes[first] != sign_extension {
            break;
        }
        first += 1;
    }
    bytes[first..].to_vec()
}
