//! Encoding raw data.
//!
//! The functions here assemble records from tags and already encoded
//! content. They never look into the content: nested records are the
//! caller’s responsibility and are composed bottom-up.

use crate::ident::{Ident, Tag};
use crate::length::Length;
use super::primitive::{Primitive, PrimitiveContent};
use super::values::{Constructed, IndefiniteConstructed, Values};


/// Returns a value encoder for a primitive record with the given content.
pub fn primitive(tag: Tag, data: &[u8]) -> Primitive<&[u8]> {
    data.encode_as(tag)
}

pub use self::primitive as prim;


/// Returns a value encoder for a definite length constructed record.
pub fn definite_constructed<V: Values>(
    tag: Tag, content: V
) -> Constructed<V> {
    Constructed::new(tag, content)
}

pub use self::definite_constructed as dcons;


/// Returns a value encoder for an indefinite length constructed record.
pub fn indefinite_constructed<V: Values>(
    tag: Tag, content: V
) -> IndefiniteConstructed<V> {
    IndefiniteConstructed::new(tag, content)
}

pub use self::indefinite_constructed as icons;


/// Assembles a single record from identifier octets and content.
///
/// The identifier and a definite length in minimal form are written before
/// `content`. If `indefinite` is `true`, the length octets signal the
/// indefinite form instead and the end-of-contents marker is appended.
pub fn write(ident: Ident, content: &[u8], indefinite: bool) -> Vec<u8> {
    let length = if indefinite {
        Length::INDEFINITE
    }
    else {
        Length::definite(content.len())
    };
    let mut res = Vec::with_capacity(
        ident.encoded_len() + length.encoded_len() + content.len() + 2
    );
    ident.append_encoded(&mut res);
    length.append_encoded(&mut res);
    res.extend_from_slice(content);
    if indefinite {
        res.extend_from_slice(b"\0\0");
    }
    res
}


//============ Tests =========================================================
