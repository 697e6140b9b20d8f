//! Reading and writing eSIM profiles.
//!
//! An eSIM profile in the interoperable format is a sequence of profile
//! elements encoded in the Basic Encoding Rules of ASN.1. This crate reads
//! such a sequence into a [`Profile`], gives typed access to the elements,
//! and writes it back.
//!
//! Decoding is lenient: records cut short are clamped to the available data
//! and flagged, elements with unknown tags are kept as they are, and inner
//! records without a field of their own are retained. Encoding an untouched
//! element reproduces the exact octets it was decoded from.
//!
//! The lower layers are available, too. The [`decode`] module reads single
//! tag-length-value records, the [`encode`] module provides the machinery
//! for writing them.
//!
//! ```
//! use saip::{ElementValue, Profile};
//!
//! let data = b"\xA0\x05\x80\x01\x02\x81\x00\xBF\x3F\x02\xA0\x00";
//! let profile = Profile::from_slice(data).unwrap();
//! assert_eq!(profile.len(), 2);
//! assert_eq!(profile.header().unwrap().major_version, Some(2));
//! assert!(matches!(profile.elements()[1].value(), ElementValue::End(_)));
//! assert_eq!(profile.encode().unwrap(), data);
//! ```

pub use self::captured::Captured;
pub use self::decode::{DecodeError, ErrorKind};
pub use self::encode::EncodeError;
pub use self::ident::{
    Class, Ident, Tag, decode_tag_number, encode_tag_number,
};
pub use self::int::Unsigned;
pub use self::length::{Length, LengthOctets, decode_length, encode_length};
pub use self::limits::Limits;
pub use self::oid::Oid;
pub use self::profile::{
    ElementMut, ElementValue, Kind, Profile, ProfileElement,
};

pub mod captured;
pub mod decode;
pub mod encode;
pub mod int;
pub mod oid;
pub mod profile;

mod ident;
mod length;
mod limits;
