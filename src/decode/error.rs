//! Error Handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use thiserror::Error;
use super::source::Pos;


//------------ ErrorKind -----------------------------------------------------

/// The reason why decoding failed.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ErrorKind {
    /// The data ended before a header or declared content was complete.
    #[error("unexpected end of data")]
    Truncated,

    /// A long-form tag number ran off the end of the data.
    #[error("tag number continuation runs past end of data")]
    TagContinuation,

    /// A tag number does not fit into 32 bits.
    #[error("tag number exceeds 32 bits")]
    TagTooLarge,

    /// The reserved length octet 0xFF was encountered.
    #[error("illegal length octets")]
    IllegalLength,

    /// A definite length does not fit into a `usize`.
    #[error("excessive length")]
    LengthTooLarge,

    /// Indefinite length values were nested deeper than allowed.
    #[error("nesting exceeds depth limit of {0}")]
    TooDeep(usize),

    /// Scanning for an end-of-contents marker walked too far.
    #[error("indefinite length scan exceeds {0} octets")]
    ScanLimit(usize),

    /// A top-level element was cut short and truncation is rejected.
    #[error("truncated profile element")]
    TruncatedElement,

    /// The content of a record does not fit the field it belongs to.
    #[error("{0}")]
    Malformed(&'static str),
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// The error carries the offset into the top-level buffer where decoding
/// stopped and, when decoding a profile, the index of the element that was
/// being decoded.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("{kind} at offset {pos}")]
pub struct DecodeError {
    kind: ErrorKind,
    pos: Pos,
    element: Option<usize>,
}

impl DecodeError {
    /// Creates a new error of the given kind at the given position.
    pub fn new(kind: ErrorKind, pos: impl Into<Pos>) -> Self {
        DecodeError { kind, pos: pos.into(), element: None }
    }

    /// Creates a malformed content error.
    pub fn malformed(msg: &'static str, pos: impl Into<Pos>) -> Self {
        Self::new(ErrorKind::Malformed(msg), pos)
    }

    /// Attaches the index of the profile element being decoded.
    pub fn at_element(mut self, element: usize) -> Self {
        self.element = Some(element);
        self
    }

    /// Returns the reason for the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the byte offset at which decoding stopped.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns the index of the element being decoded, if known.
    pub fn element(&self) -> Option<usize> {
        self.element
    }
}
