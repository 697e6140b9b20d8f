//! The identifier octets of an encoded record.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::fmt;
use smallvec::SmallVec;
use crate::decode::ErrorKind;


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// The class occupies the two most significant bits of the first identifier
/// octet. The derived ordering is the order of these bit patterns, which is
/// also the order used when emitting otherwise unordered inner records.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    /// Returns the class encoded in the first identifier octet.
    pub const fn from_u8(octet: u8) -> Self {
        match octet {
            0x00..=0x3F => Self::Universal,
            0x40..=0x7F => Self::Application,
            0x80..=0xBF => Self::Context,
            0xC0..=0xFF => Self::Private
        }
    }

    /// Returns the class bits for the first identifier octet.
    pub const fn into_u8(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::Context => 0x80,
            Self::Private => 0xC0,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a record.
///
/// A tag consists of one of four classes, represented by the [`Class`]
/// enum, and a number within this class. Whether the record is primitive
/// or constructed is not part of the tag but of the [`Ident`].
///
/// # Limitations
///
/// We only support tag numbers that fit into a `u32`. Profile element
/// discriminants stay far below that.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag {
    class: Class,
    number: u32,
}

impl Tag {
    /// The tag marking the end-of-contents in an indefinite length value.
    ///
    /// This is UNIVERSAL 0.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, 0);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a new tag in class “context specific” with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Creates a new tag in the application class with the given number.
    pub const fn application(number: u32) -> Self {
        Self::new(Class::Application, number)
    }

    /// Creates a new tag in the private class with the given number.
    pub const fn private(number: u32) -> Self {
        Self::new(Class::Private, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the tag is of the context specific class.
    pub const fn is_context_specific(self) -> bool {
        matches!(self.class, Class::Context)
    }

    /// Returns identifier octets for this tag in the given form.
    pub const fn ident(self, constructed: bool) -> Ident {
        Ident { tag: self, constructed }
    }

    /// Returns identifier octets for this tag in primitive form.
    pub const fn primitive(self) -> Ident {
        self.ident(false)
    }

    /// Returns identifier octets for this tag in constructed form.
    pub const fn constructed(self) -> Ident {
        self.ident(true)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.class {
            Class::Universal => write!(f, "[UNIVERSAL ")?,
            Class::Application => write!(f, "[APPLICATION ")?,
            Class::Context => write!(f, "[")?,
            Class::Private => write!(f, "[PRIVATE ")?,
        }
        write!(f, "{}]", self.number)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//------------ Ident ---------------------------------------------------------

/// The identifier octets of a record.
///
/// These combine the [`Tag`] with the form of the record, i.e., whether it
/// is primitive or constructed.
///
/// # BER Encoding
///
/// The first octet carries the class in bits 8 and 7 and the form in bit 6.
/// If the tag number is 30 or less, it is kept in bits 5 to 1. Otherwise
/// these bits are all set and the number follows base 128, most significant
/// group first, with bit 8 set on every octet but the last one.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident {
    tag: Tag,
    constructed: bool,
}

impl Ident {
    /// The identifier octets of the end-of-contents marker.
    pub const END_OF_CONTENTS: Self = Tag::END_OF_CONTENTS.primitive();

    /// The mask for the class bits.
    const CLASS_MASK: u8 = 0xC0;

    /// The bit signalling constructed encoding.
    const CONSTRUCTED_MASK: u8 = 0x20;

    /// The low five bits of the first octet.
    const SHORT_NUMBER_MASK: u8 = 0x1F;

    /// The largest number that fits into the first octet.
    const MAX_SHORT_NUMBER: u32 = 0x1E;

    /// Creates identifier octets from their components.
    pub const fn new(class: Class, constructed: bool, number: u32) -> Self {
        Ident { tag: Tag::new(class, number), constructed }
    }

    /// Returns the tag.
    pub const fn tag(self) -> Tag {
        self.tag
    }

    /// Returns the class of the identifier octets.
    pub const fn class(self) -> Class {
        self.tag.class
    }

    /// Returns whether the record uses constructed encoding.
    pub const fn is_constructed(self) -> bool {
        self.constructed
    }

    /// Returns the full tag number.
    pub const fn number(self) -> u32 {
        self.tag.number
    }

    /// Returns the value of the low five bits of the first octet.
    ///
    /// This equals the tag number for numbers up to 30 and is 31 for
    /// everything encoded in long form.
    pub const fn short_number(self) -> u8 {
        if self.tag.number <= Self::MAX_SHORT_NUMBER {
            self.tag.number as u8
        }
        else {
            Self::SHORT_NUMBER_MASK
        }
    }

    /// Returns the first identifier octet.
    pub const fn first(self) -> u8 {
        let mut res = self.tag.class.into_u8() | self.short_number();
        if self.constructed {
            res |= Self::CONSTRUCTED_MASK
        }
        res
    }

    /// Parses identifier octets from the beginning of `data`.
    ///
    /// Returns the identifier and the number of octets it occupied.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), ErrorKind> {
        let first = match data.first() {
            Some(first) => *first,
            None => return Err(ErrorKind::Truncated)
        };
        let class = Class::from_u8(first & Self::CLASS_MASK);
        let constructed = first & Self::CONSTRUCTED_MASK != 0;
        if first & Self::SHORT_NUMBER_MASK != Self::SHORT_NUMBER_MASK {
            return Ok((
                Self::new(
                    class, constructed,
                    u32::from(first & Self::SHORT_NUMBER_MASK)
                ),
                1
            ))
        }
        let (number, used) = decode_tag_number(data.get(1..).unwrap_or(&[]))?;
        Ok((Self::new(class, constructed, number), used + 1))
    }

    /// Returns the encoded identifier octets.
    pub fn to_octets(self) -> SmallVec<[u8; 6]> {
        let mut res = SmallVec::new();
        res.push(self.first());
        if self.tag.number > Self::MAX_SHORT_NUMBER {
            res.extend_from_slice(&encode_tag_number(self.tag.number));
        }
        res
    }

    /// Returns the number of octets of the encoded form.
    pub fn encoded_len(self) -> usize {
        if self.tag.number > Self::MAX_SHORT_NUMBER {
            1 + encode_tag_number(self.tag.number).len()
        }
        else {
            1
        }
    }

    /// Appends the encoded identifier octets to `target`.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.to_octets())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.constructed {
            write!(f, "{} constructed", self.tag)
        }
        else {
            write!(f, "{} primitive", self.tag)
        }
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ident({} - {:02X?})", self, self.to_octets().as_slice())
    }
}


//------------ Tag numbers ---------------------------------------------------

/// Encodes a tag number as a sequence of base 128 groups.
///
/// The most significant group comes first and every group but the last has
/// bit 8 set. Zero encodes as a single zero octet. No leading group is ever
/// all zero.
pub fn encode_tag_number(number: u32) -> SmallVec<[u8; 5]> {
    let mut res = SmallVec::new();
    let mut shift = 28;
    // Skip the leading empty groups. The last group is always present.
    while shift > 0 && number >> shift == 0 {
        shift -= 7;
    }
    while shift > 0 {
        res.push(((number >> shift) & 0x7F) as u8 | 0x80);
        shift -= 7;
    }
    res.push((number & 0x7F) as u8);
    res
}

/// Decodes a base 128 tag number from the beginning of `data`.
///
/// Returns the number and how many octets were consumed. If the data ends
/// before an octet with bit 8 cleared is found, returns
/// [`ErrorKind::TagContinuation`].
pub fn decode_tag_number(data: &[u8]) -> Result<(u32, usize), ErrorKind> {
    let mut res = 0u32;
    for (idx, octet) in data.iter().enumerate() {
        if res > (u32::MAX >> 7) {
            return Err(ErrorKind::TagTooLarge)
        }
        res = (res << 7) | u32::from(octet & 0x7F);
        if octet & 0x80 == 0 {
            return Ok((res, idx + 1))
        }
    }
    Err(ErrorKind::TagContinuation)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const CLASSES: &[Class] = &[
        Class::Universal, Class::Application, Class::Context, Class::Private
    ];

    #[test]
    fn tag_number_inverse() {
        for &n in &[0, 1, 30, 31, 127, 128, 16383, 16384, 0x1F_FFFF, u32::MAX] {
            let enc = encode_tag_number(n);
            assert_eq!(decode_tag_number(&enc), Ok((n, enc.len())), "{n}");
        }
    }

    #[test]
    fn tag_number_octets() {
        assert_eq!(encode_tag_number(0).as_slice(), b"\x00");
        assert_eq!(encode_tag_number(31).as_slice(), b"\x1F");
        assert_eq!(encode_tag_number(63).as_slice(), b"\x3F");
        assert_eq!(encode_tag_number(127).as_slice(), b"\x7F");
        assert_eq!(encode_tag_number(128).as_slice(), b"\x81\x00");
        assert_eq!(encode_tag_number(16383).as_slice(), b"\xFF\x7F");
        assert_eq!(encode_tag_number(16384).as_slice(), b"\x81\x80\x00");
        assert_eq!(
            encode_tag_number(u32::MAX).as_slice(),
            b"\x8F\xFF\xFF\xFF\x7F"
        );
    }

    #[test]
    fn tag_number_failures() {
        assert_eq!(
            decode_tag_number(b"\x81\x80"), Err(ErrorKind::TagContinuation)
        );
        assert_eq!(decode_tag_number(b""), Err(ErrorKind::TagContinuation));
        assert_eq!(
            decode_tag_number(b"\x90\x80\x80\x80\x00"),
            Err(ErrorKind::TagTooLarge)
        );
        // A leading empty group is tolerated when reading.
        assert_eq!(decode_tag_number(b"\x80\x3F"), Ok((63, 2)));
    }

    #[test]
    fn single_octet_idents() {
        for &class in CLASSES {
            for number in 0..=30 {
                for &constructed in &[false, true] {
                    let ident = Ident::new(class, constructed, number);
                    let octets = ident.to_octets();
                    assert_eq!(octets.len(), 1);
                    assert_eq!(ident.short_number() as u32, number);
                    assert_eq!(Ident::parse(&octets), Ok((ident, 1)));
                }
            }
        }
    }

    #[test]
    fn multi_octet_idents() {
        for &class in CLASSES {
            for &number in &[31, 63, 127, 128, 300, 16383, 16384] {
                let ident = Ident::new(class, true, number);
                let octets = ident.to_octets();
                assert_eq!(octets[0] & 0x1F, 0x1F);
                assert_eq!(ident.short_number(), 31);
                assert_eq!(octets.len(), ident.encoded_len());
                assert_eq!(Ident::parse(&octets), Ok((ident, octets.len())));
            }
        }
    }

    #[test]
    fn profile_element_idents() {
        assert_eq!(Tag::ctx(0).constructed().to_octets().as_slice(), b"\xA0");
        assert_eq!(
            Tag::ctx(63).constructed().to_octets().as_slice(), b"\xBF\x3F"
        );
        let (ident, len) = Ident::parse(b"\x80\x01\x05").unwrap();
        assert_eq!(len, 1);
        assert_eq!(ident.class(), Class::Context);
        assert!(!ident.is_constructed());
        assert_eq!(ident.number(), 0);
    }

    #[test]
    fn ident_failures() {
        assert_eq!(Ident::parse(b""), Err(ErrorKind::Truncated));
        assert_eq!(Ident::parse(b"\xBF"), Err(ErrorKind::TagContinuation));
        assert_eq!(Ident::parse(b"\xBF\x81"), Err(ErrorKind::TagContinuation));
    }

    #[test]
    fn class_order() {
        assert!(Tag::application(15) < Tag::ctx(0));
        assert!(Tag::ctx(30) < Tag::private(1));
        assert!(Tag::SEQUENCE < Tag::application(0));
    }
}
