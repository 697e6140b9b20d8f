//! Captured encoded data.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use bytes::Bytes;
use crate::decode::Record;
use crate::encode::{self, Target, Values};
use crate::ident::{Ident, Tag};


//------------ Captured ------------------------------------------------------

/// The complete encoding of a single record.
///
/// A value of this type keeps the octets of a record exactly as they were
/// decoded, including the header and an end-of-contents marker if the
/// record had one. It is used wherever the content of a record is not
/// interpreted but has to be reproduced verbatim when encoding.
#[derive(Clone, Eq, PartialEq)]
pub struct Captured {
    /// The identifier octets of the record.
    ident: Ident,

    /// All octets of the record.
    bytes: Bytes,
}

impl Captured {
    /// Creates a captured record from identifier octets and content.
    ///
    /// The record will use a definite length in minimal form.
    pub fn new(ident: Ident, content: &[u8]) -> Self {
        Captured {
            ident,
            bytes: encode::write(ident, content, false).into(),
        }
    }

    /// Captures a decoded record.
    pub fn from_record(record: &Record) -> Self {
        Captured {
            ident: record.ident(),
            bytes: record.raw().clone(),
        }
    }

    /// Captures the output of a value encoder.
    ///
    /// If the encoder doesn’t produce a record, the identifier is that of
    /// the end-of-contents marker.
    pub fn from_values<V: Values + ?Sized>(values: &V) -> Self {
        let bytes = Bytes::from(values.to_vec());
        let ident = match Ident::parse(&bytes) {
            Ok((ident, _)) => ident,
            Err(_) => Ident::END_OF_CONTENTS,
        };
        Captured { ident, bytes }
    }

    /// Returns the identifier octets of the record.
    pub fn ident(&self) -> Ident {
        self.ident
    }

    /// Returns the tag of the record.
    pub fn tag(&self) -> Tag {
        self.ident.tag()
    }

    /// Returns the octets of the record.
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Returns the octets of the record as a bytes value.
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Converts the value into its octets.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Returns the number of octets of the record.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether there are no octets at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}


//--- AsRef

impl AsRef<[u8]> for Captured {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- Debug

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Captured({}, {})", self.ident, hex::encode(&self.bytes))
    }
}


//--- encode::Values

impl Values for Captured {
    fn encoded_len(&self) -> usize {
        self.bytes.len()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&self.bytes)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::decode;
    use super::*;

    #[test]
    fn capture_record() {
        let data = Bytes::from_static(b"\xDF\x1F\x02\x01\x02\x80\x00");
        let (record, rest) = decode::read(&data).unwrap().unwrap();
        let captured = record.capture();
        assert_eq!(captured.tag(), Tag::private(31));
        assert_eq!(captured.as_slice(), b"\xDF\x1F\x02\x01\x02");
        assert_eq!(captured.to_vec(), b"\xDF\x1F\x02\x01\x02");
        assert_eq!(rest.as_ref(), b"\x80\x00");
    }

    #[test]
    fn new_and_from_values() {
        let captured = Captured::new(Tag::ctx(5).constructed(), b"\x80\x00");
        assert_eq!(captured.as_slice(), b"\xA5\x02\x80\x00");
        assert_eq!(captured.ident(), Tag::ctx(5).constructed());

        let again = Captured::from_values(&captured);
        assert_eq!(again, captured);
        assert_eq!(
            format!("{:?}", again),
            "Captured([5] constructed, a5028000)"
        );
    }
}
