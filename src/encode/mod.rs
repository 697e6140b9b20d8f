//! Encoding TLV records.
//!
//! Encoding is done using helper types called _encoders_ that represent the
//! structure of the encoding. These types implement the trait [`Values`].
//! A type that can be encoded typically provides a method named `encode`
//! that produces a value of its encoder type. Most of them need the tag to
//! use for the outermost record since profile element fields are tagged
//! implicitly.
//!
//! The [`Values`] type can then be written to anything that implements
//! [`Target`], most notably a `Vec<u8>`.
//!
//! The trait [`PrimitiveContent`] helps with producing encoders for types
//! that use the primitive encoding. Through this trait the types can declare
//! how their content is encoded and receive an automatic encoder type based
//! on that.
//!
//! Finally, the functions in the [`raw`] module assemble records from
//! already encoded content and [`write`] produces a single record from
//! identifier octets and content.

pub use self::error::EncodeError;
pub use self::primitive::{PrimitiveContent, Primitive};
pub use self::raw::write;
pub use self::target::{Target, infallible};
pub use self::values::{
    Values,
    Choice2, Constructed, EncodeSlice, IndefiniteConstructed, Iter, Nothing,
    encode_slice, iter, sequence, sequence_as, total_indefinite_len,
    total_len, write_end_of_contents, write_header, write_indefinite_header,
};

pub mod raw;

mod error;
mod primitive;
mod target;
mod values;
