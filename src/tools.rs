//!
//! Contains a number of tools that are useful when working with EBML encoded data.
//!

use std::convert::TryInto;

use super::errors::{ReadError, ToolError};
use super::sources::SegmentSource;

///
/// Sentinel value returned by [`read_size`] when the size field holds the
/// reserved all-ones bit pattern, meaning the element's extent must be
/// inferred from its content.
///
pub const UNKNOWN_SIZE: u64 = u64::MAX;

///
/// Trait to enable easy serialization to a vint.
///
/// This is only available for types that can be cast as `u64`.
///
pub trait Vint: Into<u64> + Copy {
    ///
    /// Returns a representation of the current value as a vint array.
    ///
    /// # Errors
    ///
    /// This can return an error if the value is too large to be representable as a vint.
    ///
    fn as_vint(&self) -> Result<Vec<u8>, ToolError> {
        let val: u64 = (*self).into();
        let length = vint_size(val)?;
        Ok(as_vint_no_check_u64(val, length))
    }
}

impl Vint for u64 { }
impl Vint for u32 { }
impl Vint for u16 { }
impl Vint for u8 { }

///
/// Returns the number of bytes the minimal vint encoding of `val` occupies.
///
/// The encoding is one byte longer than the numeric minimum whenever the
/// shorter form would be the reserved all-ones "unknown size" pattern, so
/// that every encodable value survives a decode round-trip.
///
/// # Errors
///
/// This can return an error if the value is too large to be representable as a vint.
///
pub fn vint_size(val: u64) -> Result<usize, ToolError> {
    let mut length = 1;
    while length <= 8 {
        if val < (1u64 << (7 * length)) {
            break;
        }
        length += 1;
    }

    // all-ones is reserved for the unknown-size sentinel
    if length <= 8 && val == (1u64 << (7 * length)) - 1 {
        length += 1;
    }

    if length > 8 {
        Err(ToolError::WriteVintOverflow(val))
    } else {
        Ok(length)
    }
}

#[inline]
fn as_vint_no_check_u64(val: u64, length: usize) -> Vec<u8> {
    let bytes: [u8; 8] = val.to_be_bytes();
    let mut result: Vec<u8> = Vec::from(&bytes[(8-length)..]);
    result[0] |= 1 << (8 - length);
    result
}

///
/// Reads a vint from the beginning of the input array slice.
///
/// This method returns an option with the `None` variant used to indicate there was not enough data in the buffer to completely read a vint.
///
/// The returned tuple contains the value of the vint (`u64`) and the length of the vint (`usize`).  The length will be less than or equal to the length of the input slice.
///
/// # Errors
///
/// This method can return a `ToolError` if the input array cannot be read as a vint.
///
pub fn read_vint(buffer: &[u8]) -> Result<Option<(u64, usize)>, ToolError> {
    if buffer.is_empty() {
        return Ok(None);
    }

    if buffer[0] == 0 {
        return Err(ToolError::ReadVintOverflow)
    }

    let length = 8 - buffer[0].ilog2() as usize;

    if length > buffer.len() {
        // Not enough data in the buffer to read out the vint value
        return Ok(None);
    }

    let mut value = buffer[0] as u64;
    value -= 1 << (8 - length);

    for item in buffer.iter().take(length).skip(1) {
        value <<= 8;
        value += *item as u64;
    }

    Ok(Some((value, length)))
}

///
/// Reads an element id from the window's current position and advances past it.
///
/// Element ids keep their leading marker bits, so the id of the EBML header
/// element reads as `0x1A45DFA3` rather than the unmarked `0x0A45DFA3`.
///
pub(crate) fn read_id(source: &mut SegmentSource) -> Result<u64, ReadError> {
    let head = source.read_at(source.position(), 8)?;
    match read_vint(&head).map_err(|e| ReadError::CorruptedData(e.to_string()))? {
        Some((value, length)) => {
            source.set_position(source.position() + length as u64);
            Ok(value + (1 << (7 * length)))
        },
        None => Err(ReadError::UnexpectedEof { expected: "element id", position: source.position() }),
    }
}

///
/// Reads a size field from the window's current position and advances past it.
///
/// Returns [`UNKNOWN_SIZE`] when the field holds the reserved all-ones pattern.
///
pub(crate) fn read_size(source: &mut SegmentSource) -> Result<u64, ReadError> {
    let head = source.read_at(source.position(), 8)?;
    match read_vint(&head).map_err(|e| ReadError::CorruptedData(e.to_string()))? {
        Some((value, length)) => {
            source.set_position(source.position() + length as u64);
            if value == (1u64 << (7 * length)) - 1 {
                Ok(UNKNOWN_SIZE)
            } else {
                Ok(value)
            }
        },
        None => Err(ReadError::UnexpectedEof { expected: "element size", position: source.position() }),
    }
}

///
/// Returns the serialized form of an element id: its big-endian bytes with
/// leading zero bytes stripped (the marker bits are already part of the id).
///
pub(crate) fn id_bytes(id: u64) -> Vec<u8> {
    let bytes = id.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[first..].to_vec()
}

/// Number of bytes [`id_bytes`] produces for `id`.
pub(crate) fn id_size(id: u64) -> u64 {
    id_bytes(id).len() as u64
}

///
/// Reads a `u64` value from any length array slice.
///
/// Rather than forcing the input to be a `[u8; 8]` like standard library methods, this can interpret a `u64` from a slice of any length < 8.  Bytes are assumed to be least significant when reading the value - i.e. an array of `[4, 0]` would return a value of `1024`.
///
/// # Errors
///
/// This method will return an error if the input slice has a length > 8.
///
/// ## Example
///
/// ```
/// # use webm_tree::tools::arr_to_u64;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = arr_to_u64(&[16,0])?;
/// assert_eq!(result, 4096);
/// # Ok(())
/// # }
/// ```
///
pub fn arr_to_u64(arr: &[u8]) -> Result<u64, ToolError> {
    if arr.len() > 8 {
        return Err(ToolError::ReadU64Overflow(Vec::from(arr)));
    }

    let mut val = 0u64;
    for byte in arr {
        val *= 256;
        val += *byte as u64;
    }
    Ok(val)
}

///
/// Reads an `i64` value from any length array slice.
///
/// Rather than forcing the input to be a `[u8; 8]` like standard library methods, this can interpret an `i64` from a slice of any length < 8.  Bytes are assumed to be least significant when reading the value - i.e. an array of `[4, 0]` would return a value of `1024`.
///
/// # Errors
///
/// This method will return an error if the input slice has a length > 8.
///
/// ## Example
///
/// ```
/// # use webm_tree::tools::arr_to_i64;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = arr_to_i64(&[4,0])?;
/// assert_eq!(result, 1024);
/// # Ok(())
/// # }
/// ```
///
pub fn arr_to_i64(arr: &[u8]) -> Result<i64, ToolError> {
    if arr.len() > 8 {
        return Err(ToolError::ReadI64Overflow(Vec::from(arr)));
    }

    if arr.is_empty() {
        return Ok(0);
    }

    if arr[0] > 127 {
        if arr.len() == 8 {
            Ok(i64::from_be_bytes(arr.try_into().expect("[u8;8] should be convertible to i64")))
        } else {
            Ok(-((1 << (arr.len() * 8)) - (arr_to_u64(arr).expect("arr_to_u64 shouldn't error if length is <= 8") as i64)))
        }
    } else {
        Ok(arr_to_u64(arr).expect("arr_to_u64 shouldn't error if length is <= 8") as i64)
    }
}

///
/// Reads an `f64` value from an array slice of length 4 or 8.
///
/// This method wraps `f32` and `f64` conversions from big endian byte arrays and casts the result as an `f64`.
///
/// # Errors
///
/// This method will throw an error if the input slice length is not 4 or 8.
///
pub fn arr_to_f64(arr: &[u8]) -> Result<f64, ToolError> {
    if arr.len() == 4 {
        Ok(f32::from_be_bytes(arr.try_into().expect("arr should be [u8;4]")) as f64)
    } else if arr.len() == 8 {
        Ok(f64::from_be_bytes(arr.try_into().expect("arr should be [u8;8]")))
    } else {
        Err(ToolError::ReadF64Mismatch(Vec::from(arr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_vint_sixteen() {
        let buffer = [144];
        let result = read_vint(&buffer).unwrap().expect("Reading vint failed");

        assert_eq!(16, result.0);
        assert_eq!(1, result.1);
    }

    #[test]
    fn write_vint_sixteen() {
        let result = 16u64.as_vint().expect("Writing vint failed");
        assert_eq!(vec![144u8], result);
    }

    #[test]
    fn read_vint_one_twenty_seven() {
        let buffer = [255u8];
        let result = read_vint(&buffer).unwrap().expect("Reading vint failed");

        assert_eq!(127, result.0);
        assert_eq!(1, result.1);
    }

    #[test]
    fn write_vint_one_twenty_seven_avoids_sentinel() {
        // 0xFF is the unknown-size pattern, so 127 must take the two byte form
        let result = 127u64.as_vint().expect("Writing vint failed");
        assert_eq!(vec![0x40u8, 127u8], result);
    }

    #[test]
    fn read_vint_two_hundred() {
        let buffer = [64, 200];
        let result = read_vint(&buffer).unwrap().expect("Reading vint failed");

        assert_eq!(200, result.0);
        assert_eq!(2, result.1);
    }

    #[test]
    fn write_vint_two_hundred() {
        let result = 200u64.as_vint().expect("Writing vint failed");
        assert_eq!(vec![64u8, 200u8], result);
    }

    #[test]
    fn read_vint_for_ebml_tag() {
        let buffer = [0x1a, 0x45, 0xdf, 0xa3];
        let result = read_vint(&buffer).unwrap().expect("Reading vint failed");

        assert_eq!(0x0a45dfa3, result.0);
        assert_eq!(4, result.1);
    }

    #[test]
    fn read_vint_very_long() {
        let buffer = [1, 0, 0, 0, 0, 0, 0, 1];
        let result = read_vint(&buffer).unwrap().expect("Reading vint failed");

        assert_eq!(1, result.0);
        assert_eq!(8, result.1);
    }

    #[test]
    fn read_vint_overflow() {
        let buffer = [1, 0, 0, 0];
        let result = read_vint(&buffer).expect("Reading vint failed");

        assert_eq!(true, result.is_none());
    }

    #[test]
    #[should_panic]
    fn too_big_for_vint() {
        (1u64 << 56).as_vint().expect("Writing vint failed");
    }

    #[test]
    fn vint_encode_decode_range() {
        for val in 0..500_000u64 {
            let bytes = val.as_vint().unwrap();
            assert_eq!(bytes.len(), vint_size(val).unwrap());
            let result = read_vint(bytes.as_slice()).unwrap().unwrap().0;
            assert_eq!(val, result);
        }
    }

    #[test]
    fn vint_size_is_minimal() {
        assert_eq!(1, vint_size(0).unwrap());
        assert_eq!(1, vint_size(126).unwrap());
        assert_eq!(2, vint_size(127).unwrap());
        assert_eq!(2, vint_size(128).unwrap());
        assert_eq!(2, vint_size(16382).unwrap());
        assert_eq!(3, vint_size(16383).unwrap());
        assert_eq!(8, vint_size((1u64 << 56) - 2).unwrap());
        assert!(vint_size((1u64 << 56) - 1).is_err());
        assert!(vint_size(1u64 << 56).is_err());
    }

    #[test]
    fn size_boundaries_round_trip_across_widths() {
        for exp in 1..8usize {
            let boundary = (1u64 << (7 * exp)) - 1;
            for val in [boundary - 1, boundary, boundary + 1] {
                let bytes = val.as_vint().unwrap();
                let (decoded, len) = read_vint(&bytes).unwrap().unwrap();
                assert_eq!(val, decoded);
                assert_eq!(bytes.len(), len);
            }
        }
    }

    #[test]
    fn read_unknown_size_sentinel() {
        let mut src = SegmentSource::from_bytes(vec![0xFF]);
        assert_eq!(UNKNOWN_SIZE, read_size(&mut src).unwrap());

        let mut src = SegmentSource::from_bytes(vec![0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(UNKNOWN_SIZE, read_size(&mut src).unwrap());
    }

    #[test]
    fn read_id_restores_marker_bits() {
        let mut src = SegmentSource::from_bytes(vec![0x1a, 0x45, 0xdf, 0xa3, 0x42]);
        assert_eq!(0x1a45dfa3, read_id(&mut src).unwrap());
        assert_eq!(4, src.position());
    }

    #[test]
    fn id_bytes_strip_leading_zeroes() {
        assert_eq!(vec![0x1au8, 0x45, 0xdf, 0xa3], id_bytes(0x1a45dfa3));
        assert_eq!(vec![0xe7u8], id_bytes(0xe7));
        assert_eq!(2, id_size(0x4489));
    }

    #[test]
    fn read_u64_values() {
        let mut buffer = vec![];
        let mut expected = 0;
        for _ in 0..8 {
            buffer.push(0x25);
            expected = (expected << 8) + 0x25;

            let result = arr_to_u64(&buffer).unwrap();
            assert_eq!(expected, result);
        }
    }

    #[test]
    fn read_i64_values() {
        let mut buffer = vec![];
        let mut expected = 0;
        for _ in 0..8 {
            buffer.push(0x0a);
            expected = (expected << 8) + 0x0a;

            let result = arr_to_i64(&buffer).unwrap();
            assert_eq!(expected, result);

            let neg_result = arr_to_i64(&(buffer.iter().map(|b| !b).collect::<Vec<u8>>())).unwrap() + 1;
            assert_eq!(-expected, neg_result);
        }
    }
}
