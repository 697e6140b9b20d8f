//! Decoding TLV records.
//!
//! The central item is [`Record`] which describes one tag-length-value
//! record including its exact encoded octets. Records are read from a
//! [`Source`] one at a time via [`Record::take_opt_from`] or in bulk via
//! the [`Records`] iterator.

pub use self::error::{DecodeError, ErrorKind};
pub use self::record::{Record, Records, read};
pub use self::source::{Pos, Source};

mod error;
mod record;
mod source;
