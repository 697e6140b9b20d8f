//! The length octets.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use smallvec::SmallVec;
use crate::decode::ErrorKind;


//------------ Length -------------------------------------------------------

/// The length octets of an encoded record.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the record, or indefinite, in which case the
/// content is delimited by a special end-of-contents marker.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the length octets is one octet long and the remaining bits of this
/// first octet provide the definite length. Thus, if the first octet is
/// less than 128, it provides the definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets.
///
/// When encoding, we always produce the DER form, i.e., a definite length in
/// the minimum number of octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Length(Option<usize>);

impl Length {
    /// The indefinite length.
    pub const INDEFINITE: Self = Length(None);

    /// Creates a definite length.
    pub const fn definite(len: usize) -> Self {
        Length(Some(len))
    }

    /// Returns the length if it is definite.
    pub const fn to_definite(self) -> Option<usize> {
        self.0
    }

    /// Returns whether the length is indefinite.
    pub const fn is_indefinite(self) -> bool {
        self.0.is_none()
    }

    /// Returns the encoded length octets.
    pub fn to_octets(self) -> SmallVec<[u8; 9]> {
        match self.0 {
            Some(len) => encode_length(len),
            None => SmallVec::from_slice(&[0x80]),
        }
    }

    /// Returns the number of octets of the encoded form.
    pub fn encoded_len(self) -> usize {
        match self.0 {
            Some(len) if len > 0x7F => {
                let idx = encoded_start_idx(len);
                LEN - idx + 1
            }
            _ => 1
        }
    }

    /// Appends the encoded length to the end of `target`.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.to_octets())
    }
}


//------------ LengthOctets --------------------------------------------------

/// The result of parsing length octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LengthOctets {
    /// The length value.
    pub length: Length,

    /// The number of octets consumed.
    pub consumed: usize,

    /// Whether the long form ran past the end of the data.
    ///
    /// If this is set, `length` was assembled from the available octets
    /// only and must not be trusted.
    pub truncated: bool,
}

impl LengthOctets {
    /// Parses length octets from the beginning of `data`.
    ///
    /// A long form announcing more octets than available is clamped to what
    /// is there and flagged as truncated.
    pub fn parse(data: &[u8]) -> Result<Self, ErrorKind> {
        let first = match data.first() {
            Some(first) => *first,
            None => return Err(ErrorKind::Truncated)
        };
        match first {
            // Bit 8 clear: single.
            n if n & 0x80 == 0 => Ok(LengthOctets {
                length: Length::definite(usize::from(n)),
                consumed: 1,
                truncated: false,
            }),

            // 0x80: indefinite.
            0x80 => Ok(LengthOctets {
                length: Length::INDEFINITE,
                consumed: 1,
                truncated: false,
            }),

            // 0xFF: reserved.
            0xFF => Err(ErrorKind::IllegalLength),

            // Anything else: clear bit 8, number of octets.
            n => {
                let wanted = usize::from(n & 0x7F);
                let available = data.len() - 1;
                let (count, truncated) = if wanted > available {
                    (available, true)
                }
                else {
                    (wanted, false)
                };
                let octets = data.get(1..=count).unwrap_or(&[]);

                // Leading zeros are permitted in BER, so skip them before
                // checking whether the rest fits.
                let significant = match octets.iter().position(|&x| x != 0) {
                    Some(start) => &octets[start..],
                    None => &[][..]
                };
                if significant.len() > LEN {
                    return Err(ErrorKind::LengthTooLarge)
                }
                let len = significant.iter().fold(0usize, |len, &octet| {
                    (len << 8) | usize::from(octet)
                });
                Ok(LengthOctets {
                    length: Length::definite(len),
                    consumed: count + 1,
                    truncated,
                })
            }
        }
    }
}


//------------ Encoding helpers ----------------------------------------------

/// The number of octets in a `usize`.
const LEN: usize = 0usize.to_ne_bytes().len();

/// Encodes a definite length in its minimal form.
///
/// Lengths below 128 take a single octet. Anything else is a length-of-length
/// octet `0x80 | k` followed by the `k` big-endian octets of the value.
pub fn encode_length(len: usize) -> SmallVec<[u8; 9]> {
    let mut res = SmallVec::new();
    if len > 0x7F {
        let idx = encoded_start_idx(len);
        // LEN is never greater than 126 and idx is less than LEN.
        res.push(((LEN - idx) | 0x80) as u8);
        res.extend_from_slice(&len.to_be_bytes()[idx..]);
    }
    else {
        res.push(len as u8)
    }
    res
}

/// Decodes length octets from the beginning of `data`.
///
/// Returns the definite length (or `None` for indefinite) and the number of
/// octets consumed.
pub fn decode_length(
    data: &[u8]
) -> Result<(Option<usize>, usize), ErrorKind> {
    let res = LengthOctets::parse(data)?;
    if res.truncated {
        return Err(ErrorKind::Truncated)
    }
    Ok((res.length.to_definite(), res.consumed))
}

/// Returns the index of the first non-zero octet of `len`.
fn encoded_start_idx(len: usize) -> usize {
    (len.leading_zeros() / 8) as usize
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_from() {
        fn parse<const N: usize>(src: &[u8; N]) -> Option<usize> {
            let res = LengthOctets::parse(src.as_ref()).unwrap();
            assert_eq!(res.consumed, N);
            assert!(!res.truncated);
            res.length.to_definite()
        }

        assert_eq!(parse(b"\x00"), Some(0x00));
        assert_eq!(parse(b"\x12"), Some(0x12));
        assert_eq!(parse(b"\x7f"), Some(0x7f));
        assert_eq!(parse(b"\x80"), None);
        assert_eq!(parse(b"\x81\x00"), Some(0));
        assert_eq!(parse(b"\x81\x80"), Some(0x80));
        assert_eq!(parse(b"\x81\xF0"), Some(0xF0));
        assert_eq!(parse(b"\x82\x00\x00"), Some(0));
        assert_eq!(parse(b"\x82\xF0\x0E"), Some(0xF00E));
        assert_eq!(parse(b"\x82\x00\x0E"), Some(0x0E));
        assert_eq!(LengthOctets::parse(b"\xFF"), Err(ErrorKind::IllegalLength));
        assert_eq!(LengthOctets::parse(b""), Err(ErrorKind::Truncated));
    }

    #[test]
    fn long_form_past_end() {
        let res = LengthOctets::parse(b"\x84\x01\x02").unwrap();
        assert!(res.truncated);
        assert_eq!(res.consumed, 3);
        assert_eq!(res.length.to_definite(), Some(0x0102));
        assert_eq!(decode_length(b"\x84\x01\x02"), Err(ErrorKind::Truncated));
    }

    #[test]
    fn excessive_length() {
        let mut data = vec![0x80 | (LEN as u8 + 1), 0x01];
        data.extend_from_slice(&[0; LEN]);
        assert_eq!(
            LengthOctets::parse(&data), Err(ErrorKind::LengthTooLarge)
        );
    }

    #[test]
    fn encode() {
        fn step<const N: usize>(len: usize, res: &[u8; N]) {
            assert_eq!(
                encode_length(len).as_slice(), res.as_ref(),
                "encode failed for {len}"
            );
            assert_eq!(Length::definite(len).encoded_len(), N);
            assert_eq!(decode_length(res.as_ref()), Ok((Some(len), N)));
        }

        step(0, b"\x00");
        step(1, b"\x01");
        step(0x7f, b"\x7f");
        step(0x80, b"\x81\x80");
        step(0xff, b"\x81\xff");
        step(0x100, b"\x82\x01\x00");
        step(0xdead, b"\x82\xde\xad");
        step(0xffff, b"\x82\xff\xff");
        step(0x10000, b"\x83\x01\x00\x00");
        assert_eq!(Length::INDEFINITE.to_octets().as_slice(), b"\x80");
        assert_eq!(decode_length(b"\x80"), Ok((None, 1)));
    }
}
