//! Object Identifiers.
//!
//! This module contains the [`Oid`] type that implements object identifiers
//! as used for file system templates and GFSTE lists. The type is also
//! re-exported at the top-level.

use std::fmt;
use bytes::Bytes;
use crate::decode::{DecodeError, Record};
use crate::encode::{PrimitiveContent, Target};
use crate::ident::Tag;


//------------ Oid -----------------------------------------------------------

/// An object identifer.
///
/// Object identifiers are globally unique, hierarchical values that are used
/// to identify objects or their type. When written, they are presented as a
/// sequence of integers separated by dots such as ‘2.23.143.1.2.1’.
///
/// Values of this type keep a single object identifer in its encoded form,
/// i.e., the content octets of the record. The content is checked to be
/// well-formed when the value is created, so iterating over the components
/// never fails.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Oid(Bytes);

/// # Creation
///
impl Oid {
    /// Creates an object identifier from encoded content octets.
    ///
    /// Fails if the content is empty or the last octet has bit 8 set.
    pub fn from_content(content: Bytes) -> Result<Self, &'static str> {
        match content.last() {
            None => Err("empty object identifier"),
            Some(last) if last & 0x80 != 0 => {
                Err("object identifier ends in continuation octet")
            }
            Some(_) => Ok(Oid(content))
        }
    }

    /// Takes the object identifier from the content of a record.
    ///
    /// The tag of the record is not checked as object identifiers in
    /// profile elements are tagged implicitly.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Self::from_content(record.content().clone()).map_err(|msg| {
            record.content_err(msg)
        })
    }

    /// Creates an object identifier from its components.
    ///
    /// Returns `None` if there are fewer than two components, the first
    /// is larger than 2, or the second is 40 or more with a first component
    /// below 2.
    pub fn from_components(components: &[u32]) -> Option<Self> {
        let (first, second, rest) = match components {
            [first, second, rest @ ..] => (*first, *second, rest),
            _ => return None
        };
        if first > 2 || (first < 2 && second >= 40) {
            return None
        }
        let mut res = Vec::new();
        push_subidentifier(&mut res, (40 * first).checked_add(second)?);
        for &item in rest {
            push_subidentifier(&mut res, item);
        }
        Some(Oid(res.into()))
    }
}

/// # Access
///
impl Oid {
    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an iterator to the components of this object identifier.
    pub fn iter(&self) -> Iter {
        Iter::new(self.0.as_ref())
    }
}

/// Appends a sub-identifier in base 128 to `target`.
fn push_subidentifier(target: &mut Vec<u8>, item: u32) {
    // EEEE DDDD  DDDC CCCC  CCBB BBBB  BAAA AAAA
    if item > 0x0FFF_FFFF { target.push(0x80 | (item >> 28) as u8) }
    if item > 0x001F_FFFF { target.push(0x80 | ((item >> 21) & 0x7F) as u8) }
    if item > 0x0000_3FFF { target.push(0x80 | ((item >> 14) & 0x7F) as u8) }
    if item > 0x0000_007F { target.push(0x80 | ((item >> 7) & 0x7F) as u8) }
    target.push((item & 0x7F) as u8);
}


//--- AsRef

impl AsRef<[u8]> for Oid {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for component in self.iter() {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            match component.to_u32() {
                Some(val) => write!(f, "{}", val)?,
                None => f.write_str("(too large)")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}


//--- encode::PrimitiveContent

impl PrimitiveContent for &'_ Oid {
    const TAG: Tag = Tag::OID;

    fn encoded_len(&self) -> usize {
        self.0.len()
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.0.as_ref())
    }
}


//------------ Component -----------------------------------------------------

/// A component of an object identifier.
///
/// Although these components are integers, they are encoded in a slightly
/// inconvenient way. Because of this we don’t convert them to native integers
/// but rather keep them as references to the underlying octets. The method
/// `to_u32` allows you to try to convert a component to a native integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Component<'a> {
    /// The position of the component in the object identifer.
    position: Position,

    /// The octets of the subidentifer.
    slice: &'a [u8],
}

/// The position of the component in the object identifier.
///
/// As the first two components of the object identifer are encoded in the
/// first subidentifier of the encoded value, we have three different cases.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Position {
    /// This is the first component of the identifier.
    ///
    /// This is 0 if the integer value of the subidentifer is 0..39,
    /// 1 for 40..79, and 2 for anything else.
    First,

    /// This is the second component of the identifier.
    ///
    /// This is the integer value of the subidentifer module 40 if the value
    /// is below 80 and otherwise the value minus 80.
    Second,

    /// This is any later component of the identifier.
    Other,
}

impl<'a> Component<'a> {
    fn new(slice: &'a [u8], position: Position) -> Self {
        Component { slice, position }
    }

    /// Attempts to convert the component to `u32`.
    ///
    /// Since the component’s value can be larger than the maximum value of
    /// a `u32`, this may fail in which case the method will return `None`.
    pub fn to_u32(self) -> Option<u32> {
        // This can be at most five octets with at most four bits in the
        // topmost octet.
        if self.slice.len() > 5
            || (self.slice.len() == 5 && self.slice[0] & 0x70 != 0)
        {
            return None
        }
        let res = self.slice.iter().fold(0u32, |res, &ch| {
            res << 7 | u32::from(ch & 0x7F)
        });
        match self.position {
            Position::First => {
                if res < 40 {
                    Some(0)
                }
                else if res < 80 {
                    Some(1)
                }
                else {
                    Some(2)
                }
            }
            Position::Second => {
                if res < 80 {
                    Some(res % 40)
                }
                else {
                    Some(res - 80)
                }
            }
            Position::Other => Some(res)
        }
    }
}


//------------ Iter ----------------------------------------------------------

/// An iterator over the components in an object identifier.
pub struct Iter<'a> {
    /// The remainder of the object identifier’s encoded octets.
    slice: &'a [u8],

    /// The position of the next component.
    position: Position,
}

impl<'a> Iter<'a> {
    fn new(slice: &'a [u8]) -> Self {
        Iter {
            slice,
            position: Position::First
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Component<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (res, position) = match self.position {
            // The first sub-identifier yields two components.
            Position::Second => {
                let end = self.slice.iter().position(|&x| x & 0x80 == 0)?;
                let (res, tail) = self.slice.split_at(end + 1);
                self.slice = tail;
                (res, Position::Second)
            }
            position => {
                let end = self.slice.iter().position(|&x| x & 0x80 == 0)?;
                let res = self.slice.get(..end + 1)?;
                if position == Position::Other {
                    self.slice = &self.slice[end + 1..];
                }
                (res, position)
            }
        };
        self.position = match position {
            Position::First => Position::Second,
            _ => Position::Other,
        };
        Some(Component::new(res, position))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::decode;
    use crate::encode::Values;
    use super::*;

    const MF_TEMPLATE: &[u8] = b"\x67\x81\x0F\x01\x02\x01";

    #[test]
    fn components() {
        let oid = Oid::from_content(Bytes::from_static(MF_TEMPLATE)).unwrap();
        let items: Vec<_> = oid.iter().map(|c| c.to_u32().unwrap()).collect();
        assert_eq!(items, [2, 23, 143, 1, 2, 1]);
        assert_eq!(oid.to_string(), "2.23.143.1.2.1");
        assert_eq!(
            Oid::from_components(&[2, 23, 143, 1, 2, 1]).unwrap(), oid
        );
    }

    #[test]
    fn first_arc() {
        let oid = Oid::from_components(&[1, 3, 6, 1]).unwrap();
        assert_eq!(oid.as_slice(), b"\x2B\x06\x01");
        assert_eq!(oid.to_string(), "1.3.6.1");
        assert!(Oid::from_components(&[1, 40]).is_none());
        assert!(Oid::from_components(&[3, 1]).is_none());
        assert!(Oid::from_components(&[1]).is_none());
    }

    #[test]
    fn malformed() {
        assert!(Oid::from_content(Bytes::new()).is_err());
        assert!(Oid::from_content(Bytes::from_static(b"\x2B\x86")).is_err());

        let data = Bytes::from_static(b"\x81\x01\x81");
        let (record, _) = decode::read(&data).unwrap().unwrap();
        let err = Oid::from_record(&record).unwrap_err();
        assert_eq!(err.pos().to_usize(), 2);
    }

    #[test]
    fn encode() {
        let oid = Oid::from_components(&[2, 23, 143, 1, 2, 1]).unwrap();
        assert_eq!(
            (&oid).encode().to_vec(),
            b"\x06\x06\x67\x81\x0F\x01\x02\x01"
        );
        assert_eq!((&oid).encode_as(Tag::ctx(1)).to_vec()[0], 0x81);
    }
}
