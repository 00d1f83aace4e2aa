//!
//! Error types surfaced by the different layers of the crate.
//!

use std::io;
use std::string;

use thiserror::Error;

use super::ids::{ElementId, ElementKind};

///
/// Errors from the vint codec layer.
///
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unrepresentable vint size encountered.")]
    ReadVintOverflow,

    #[error("Value too large to be written as a vint: {0}")]
    WriteVintOverflow(u64),

    #[error("Could not read unsigned int from array: {0:?}")]
    ReadU64Overflow(Vec<u8>),

    #[error("Could not read int from array: {0:?}")]
    ReadI64Overflow(Vec<u8>),

    #[error("Could not read float from array: {0:?}")]
    ReadF64Mismatch(Vec<u8>),
}

///
/// Errors encountered while parsing element framing out of a source window.
///
/// These are fatal for the element being parsed.  Corrupt *framing* (a declared
/// child size that cannot fit in its parent) is deliberately not represented
/// here - the parser recovers from it by keeping the children parsed so far
/// and dropping the unparseable tail.
///
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Encountered corrupted data.  Message: {0}")]
    CorruptedData(String),

    #[error("Expected {expected}, but reached end of source at position {position}.")]
    UnexpectedEof {
        expected: &'static str,
        position: u64,
    },

    #[error("Element {id} at position {position} declared an unknown size, which is only legal for Segment and Cluster elements.")]
    UnknownSizeNotAllowed { id: ElementId, position: u64 },

    #[error("Error reading from source.")]
    ReadError {
        #[from]
        source: io::Error,
    },
}

///
/// Errors from decoding or accessing a single element's value.
///
#[derive(Debug, Error)]
pub enum ElementError {
    #[error("Error parsing data as Unsigned Int: {0}")]
    UintParseError(String),

    #[error("Error parsing data as Integer: {0}")]
    IntParseError(String),

    #[error("Error parsing data as Float: {0}")]
    FloatParseError(String),

    #[error("Error parsing data as Utf8.  See `source()` for details.")]
    Utf8ParseError {
        #[from]
        source: string::FromUtf8Error,
    },

    #[error("Element {id} holds {actual:?} data, but was accessed as {requested:?}.")]
    WrongType {
        id: ElementId,
        requested: ElementKind,
        actual: ElementKind,
    },

    #[error("Error reading element data from source.")]
    ReadError {
        #[from]
        source: io::Error,
    },
}

///
/// Errors encountered while serializing a tree back to bytes.
///
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Problem writing element size. {0}")]
    SizeError(String),

    #[error("Error writing to destination.")]
    WriteError {
        #[from]
        source: io::Error,
    },
}
