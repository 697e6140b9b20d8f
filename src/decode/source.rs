//! Sources for encoded data.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::{fmt, ops};
use bytes::Bytes;
use super::error::{DecodeError, ErrorKind};


//------------ Source --------------------------------------------------------

/// A cursor over a buffer of encoded data.
///
/// The source owns a cheaply cloneable [`Bytes`] value and remembers the
/// logical position of its first octet within the top-level buffer, so that
/// records taken from a nested source still report errors relative to the
/// whole input.
#[derive(Clone, Debug)]
pub struct Source {
    /// The remaining data.
    data: Bytes,

    /// The position of the first octet of `data`.
    pos: usize,
}

impl Source {
    /// Creates a new source starting at position zero.
    pub fn new(data: Bytes) -> Self {
        Self::with_pos(data, 0)
    }

    /// Creates a new source whose first octet is at the given position.
    pub fn with_pos(data: Bytes, pos: impl Into<Pos>) -> Self {
        Source { data, pos: pos.into().0 }
    }

    /// Returns the current position.
    pub fn pos(&self) -> Pos {
        self.pos.into()
    }

    /// Returns the remaining data.
    pub fn slice(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Returns the remaining data as a bytes value.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Returns the number of remaining octets.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Returns whether all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the n-th octet if that many octets are available.
    pub fn peek_nth(&self, n: usize) -> Option<u8> {
        self.data.get(n).copied()
    }

    /// Takes a single octet from the source.
    ///
    /// If there aren’t any more octets available, returns a truncation
    /// error.
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        match self.peek_nth(0) {
            Some(value) => {
                self.advance(1);
                Ok(value)
            }
            None => Err(self.content_err(ErrorKind::Truncated))
        }
    }

    /// Takes the next `len` octets as a bytes value.
    ///
    /// Takes fewer octets if not enough are available.
    pub fn split_to(&mut self, len: usize) -> Bytes {
        let len = len.min(self.data.len());
        self.pos += len;
        self.data.split_to(len)
    }

    /// Skips over `len` octets or whatever is left.
    pub fn advance(&mut self, len: usize) {
        let _ = self.split_to(len);
    }

    /// Returns an error of the given kind at the current position.
    pub fn content_err(&self, kind: ErrorKind) -> DecodeError {
        DecodeError::new(kind, self.pos())
    }
}


//------------ Pos -----------------------------------------------------------

/// The logical position within the top-level buffer.
///
/// Values of this type are used for diagnostics only, which is why we use
/// a newtype.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pos(usize);

impl Pos {
    /// Returns the position as an offset.
    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for Pos {
    fn from(pos: usize) -> Pos {
        Pos(pos)
    }
}

impl ops::Add<usize> for Pos {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Pos(self.0 + rhs)
    }
}

impl ops::Add for Pos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Pos(self.0 + rhs.0)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//============ Tests =========================================================
