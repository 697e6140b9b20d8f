//! Unsigned integers.
//!
//! Every integer field of a profile element is an unsigned big-endian value
//! using the minimum number of octets. Unlike BER INTEGER values, there is
//! no sign bit: 128 is encoded as the single octet `0x80`. On decode, the
//! length of the content determines the magnitude and leading zero octets
//! are tolerated.

use smallvec::SmallVec;
use crate::encode::{PrimitiveContent, Target};
use crate::ident::Tag;


//------------ Unsigned ------------------------------------------------------

/// An unsigned integer of up to 64 bits.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Unsigned(u64);

impl Unsigned {
    /// Creates a new value.
    pub const fn new(value: u64) -> Self {
        Unsigned(value)
    }

    /// Returns the value as a `u64`.
    pub const fn into_u64(self) -> u64 {
        self.0
    }

    /// Decodes the value from content octets.
    ///
    /// Empty content is zero. Returns `None` if the value doesn’t fit into
    /// 64 bits once leading zeros are skipped.
    pub fn decode(content: &[u8]) -> Option<u64> {
        let start = content.iter().position(|&x| x != 0)
            .unwrap_or(content.len());
        let significant = content.get(start..)?;
        if significant.len() > 8 {
            return None
        }
        Some(significant.iter().fold(0, |res, &octet| {
            (res << 8) | u64::from(octet)
        }))
    }

    /// Returns the minimal content octets for the value.
    ///
    /// Zero is the single octet `0x00`.
    pub fn to_octets(self) -> SmallVec<[u8; 8]> {
        let octets = self.0.to_be_bytes();
        let start = ((self.0.leading_zeros() / 8) as usize).min(7);
        SmallVec::from_slice(&octets[start..])
    }
}


//--- From

macro_rules! from_impl {
    ( $type:ident ) => {
        impl From<$type> for Unsigned {
            fn from(value: $type) -> Self {
                Unsigned(u64::from(value))
            }
        }

        impl PrimitiveContent for $type {
            const TAG: Tag = Tag::INTEGER;

            fn encoded_len(&self) -> usize {
                Unsigned::from(*self).encoded_len()
            }

            fn write_encoded<T: Target>(
                &self, target: &mut T
            ) -> Result<(), T::Error> {
                Unsigned::from(*self).write_encoded(target)
            }
        }
    }
}

from_impl!(u8);
from_impl!(u16);
from_impl!(u32);
from_impl!(u64);


//--- PrimitiveContent

impl PrimitiveContent for Unsigned {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self) -> usize {
        8 - ((self.0.leading_zeros() / 8) as usize).min(7)
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&self.to_octets())
    }
}


//============ Tests =========================================================
