//! Reading single records.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use bytes::Bytes;
use log::warn;
use crate::captured::Captured;
use crate::ident::{Ident, Tag};
use crate::int::Unsigned;
use crate::length::LengthOctets;
use crate::limits::Limits;
use super::error::{DecodeError, ErrorKind};
use super::source::{Pos, Source};


//------------ Record --------------------------------------------------------

/// A single tag-length-value record.
///
/// A record keeps the exact octets it was decoded from, the identifier
/// octets parsed from them, and where the content starts and ends. If the
/// record used the indefinite length form and its end-of-contents marker
/// was found, the two marker octets are part of the record, too.
///
/// Records that were cut short because the data ended before the declared
/// length was reached are still returned but flagged. Their content is
/// whatever octets were available.
#[derive(Clone, Debug)]
pub struct Record {
    /// The identifier octets.
    ident: Ident,

    /// The number of identifier and length octets.
    header_len: usize,

    /// All octets of the record, header and trailer included.
    raw: Bytes,

    /// The content octets.
    content: Bytes,

    /// Whether the record ends in an end-of-contents marker.
    trailer: bool,

    /// Whether the content was clamped to the available data.
    truncated: bool,

    /// The position of the first identifier octet.
    pos: Pos,

    /// The nesting depth of the record.
    depth: usize,

    /// The limits in effect when the record was read.
    limits: Limits,
}

/// # Reading Records
///
impl Record {
    /// Takes the next record from the source.
    ///
    /// Returns `Ok(None)` if the source is exhausted.
    pub fn take_opt_from(
        source: &mut Source, limits: &Limits
    ) -> Result<Option<Self>, DecodeError> {
        Self::take_opt_from_depth(source, limits, 0)
    }

    /// Takes the next mandatory record from the source.
    ///
    /// Returns a truncation error if the source is exhausted.
    pub fn take_from(
        source: &mut Source, limits: &Limits
    ) -> Result<Self, DecodeError> {
        match Self::take_opt_from(source, limits)? {
            Some(record) => Ok(record),
            None => Err(source.content_err(ErrorKind::Truncated))
        }
    }

    fn take_opt_from_depth(
        source: &mut Source, limits: &Limits, depth: usize,
    ) -> Result<Option<Self>, DecodeError> {
        if source.is_empty() {
            return Ok(None)
        }
        let start = source.pos();
        let data = source.bytes().clone();

        let (ident, ident_len) = Ident::parse(&data).map_err(|kind| {
            match kind {
                // Parsing stopped at the end of the data.
                ErrorKind::TagContinuation => {
                    DecodeError::new(kind, start + data.len())
                }
                _ => DecodeError::new(kind, start)
            }
        })?;

        let octets = LengthOctets::parse(
            data.get(ident_len..).unwrap_or(&[])
        ).map_err(|kind| DecodeError::new(kind, start + ident_len))?;
        let header_len = ident_len + octets.consumed;
        let available = data.len() - header_len;

        let (content_len, trailer, truncated) = if octets.truncated {
            warn!(
                "length octets of record {} at offset {} run past end of data",
                ident, start
            );
            (0, false, true)
        }
        else {
            match octets.length.to_definite() {
                Some(len) if len <= available => (len, false, false),
                Some(len) => {
                    if available == 0 {
                        return Err(DecodeError::new(
                            ErrorKind::Truncated, start + header_len
                        ))
                    }
                    warn!(
                        "record {} at offset {} declares {} content octets \
                         but only {} remain",
                        ident, start, len, available
                    );
                    (available, false, true)
                }
                None => {
                    let (len, trailer) = Self::scan_indefinite(
                        data.slice(header_len..), start + header_len,
                        limits, depth
                    )?;
                    (len, trailer, false)
                }
            }
        };

        let end = header_len + content_len + if trailer { 2 } else { 0 };
        let res = Record {
            ident,
            header_len,
            raw: data.slice(..end),
            content: data.slice(header_len..header_len + content_len),
            trailer,
            truncated,
            pos: start,
            depth,
            limits: *limits,
        };
        source.advance(end);
        Ok(Some(res))
    }

    /// Finds the end of the content of an indefinite length value.
    ///
    /// Walks over the nested records in `data` until it finds an
    /// end-of-contents marker. Returns the length of the content and whether
    /// the marker was found. If the data ends or stops being parseable
    /// before a marker shows up, all of `data` is content.
    fn scan_indefinite(
        data: Bytes, pos: Pos, limits: &Limits, depth: usize
    ) -> Result<(usize, bool), DecodeError> {
        if depth >= limits.max_depth() {
            return Err(DecodeError::new(
                ErrorKind::TooDeep(limits.max_depth()), pos
            ))
        }
        let mut inner = Source::with_pos(data.clone(), pos);
        loop {
            let consumed = data.len() - inner.remaining();
            if consumed > limits.max_scan() {
                return Err(inner.content_err(
                    ErrorKind::ScanLimit(limits.max_scan())
                ))
            }
            match (inner.peek_nth(0), inner.peek_nth(1)) {
                (Some(0), Some(0)) => return Ok((consumed, true)),
                (None, _) => break,
                _ => { }
            }
            match Self::take_opt_from_depth(&mut inner, limits, depth + 1) {
                Ok(Some(_)) => { }
                Ok(None) => break,
                Err(err) => match err.kind() {
                    ErrorKind::TooDeep(_) | ErrorKind::ScanLimit(_) => {
                        return Err(err)
                    }
                    _ => break
                }
            }
        }
        warn!(
            "indefinite length value at offset {} has no end-of-contents \
             marker",
            pos
        );
        Ok((data.len(), false))
    }
}

/// # Access to the Parts
///
impl Record {
    /// Returns the identifier octets.
    pub fn ident(&self) -> Ident {
        self.ident
    }

    /// Returns the tag.
    pub fn tag(&self) -> Tag {
        self.ident.tag()
    }

    /// Returns the full tag number.
    pub fn number(&self) -> u32 {
        self.ident.number()
    }

    /// Returns whether the record uses constructed encoding.
    pub fn is_constructed(&self) -> bool {
        self.ident.is_constructed()
    }

    /// Returns the number of identifier and length octets.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Returns the content octets.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Returns the end-of-contents marker if there was one.
    pub fn trailer(&self) -> Option<&[u8]> {
        if self.trailer {
            self.raw.get(self.raw.len() - 2..)
        }
        else {
            None
        }
    }

    /// Returns all octets of the record.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the total number of octets of the record.
    pub fn full_len(&self) -> usize {
        self.raw.len()
    }

    /// Returns whether the content was clamped to the available data.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Returns the position of the first identifier octet.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns the position of the first content octet.
    pub fn content_pos(&self) -> Pos {
        self.pos + self.header_len
    }

    /// Returns an iterator over the records nested in the content.
    pub fn records(&self) -> Records {
        Records {
            source: Source::with_pos(
                self.content.clone(), self.content_pos()
            ),
            limits: self.limits,
            depth: self.depth + 1,
            done: false,
        }
    }

    /// Returns a copy of the record’s octets.
    pub fn capture(&self) -> Captured {
        Captured::from_record(self)
    }

    /// Returns a malformed error at the start of the content.
    pub fn content_err(&self, msg: &'static str) -> DecodeError {
        DecodeError::malformed(msg, self.content_pos())
    }
}

/// # Interpreting the Content
///
impl Record {
    /// Interprets the content as an unsigned integer limited to a `u8`.
    pub fn to_u8(&self) -> Result<u8, DecodeError> {
        u8::try_from(self.to_u64()?).map_err(|_| {
            self.content_err("integer does not fit into 8 bits")
        })
    }

    /// Interprets the content as an unsigned integer limited to a `u16`.
    pub fn to_u16(&self) -> Result<u16, DecodeError> {
        u16::try_from(self.to_u64()?).map_err(|_| {
            self.content_err("integer does not fit into 16 bits")
        })
    }

    /// Interprets the content as an unsigned integer limited to a `u32`.
    pub fn to_u32(&self) -> Result<u32, DecodeError> {
        u32::try_from(self.to_u64()?).map_err(|_| {
            self.content_err("integer does not fit into 32 bits")
        })
    }

    /// Interprets the content as an unsigned integer limited to a `u64`.
    pub fn to_u64(&self) -> Result<u64, DecodeError> {
        Unsigned::decode(&self.content).ok_or_else(|| {
            self.content_err("integer does not fit into 64 bits")
        })
    }

    /// Interprets the content as a UTF-8 string.
    pub fn to_utf8(&self) -> Result<String, DecodeError> {
        String::from_utf8(self.content.to_vec()).map_err(|_| {
            self.content_err("invalid UTF-8 string")
        })
    }
}


//------------ Records -------------------------------------------------------

/// An iterator over a sequence of records.
///
/// The iterator stops after the first error.
#[derive(Clone, Debug)]
pub struct Records {
    source: Source,
    limits: Limits,
    depth: usize,
    done: bool,
}

impl Records {
    /// Creates an iterator over the records in `data`.
    pub fn new(data: Bytes, limits: Limits) -> Self {
        Records {
            source: Source::new(data),
            limits,
            depth: 0,
            done: false,
        }
    }

    /// Returns the position of the next record.
    pub fn pos(&self) -> Pos {
        self.source.pos()
    }
}

impl Iterator for Records {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None
        }
        match Record::take_opt_from_depth(
            &mut self.source, &self.limits, self.depth
        ) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}


//------------ read ----------------------------------------------------------

/// Reads the first record of `buffer`.
///
/// Returns the record and the remainder of the buffer or `Ok(None)` if the
/// buffer is empty. A caller can loop over the remainder until it is empty.
/// The positions in records and errors are relative to `buffer`.
pub fn read(buffer: &Bytes) -> Result<Option<(Record, Bytes)>, DecodeError> {
    let mut source = Source::new(buffer.clone());
    match Record::take_opt_from(&mut source, &Limits::default())? {
        Some(record) => Ok(Some((record, source.bytes().clone()))),
        None => Ok(None)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::ident::Class;
    use super::*;

    fn take(data: &'static [u8]) -> Result<Option<Record>, DecodeError> {
        Record::take_opt_from(
            &mut Source::new(Bytes::from_static(data)), &Limits::default()
        )
    }

    #[test]
    fn primitive_record() {
        let record = take(b"\x80\x01\x05").unwrap().unwrap();
        assert_eq!(record.ident().class(), Class::Context);
        assert!(!record.is_constructed());
        assert_eq!(record.number(), 0);
        assert_eq!(record.content().as_ref(), b"\x05");
        assert_eq!(record.header_len(), 2);
        assert_eq!(record.full_len(), 3);
        assert!(record.trailer().is_none());
        assert!(!record.is_truncated());
    }

    #[test]
    fn long_tag_record() {
        let record = take(b"\xBF\x3F\x05\xA0\x03\x80\x01\x1F").unwrap().unwrap();
        assert_eq!(record.number(), 63);
        assert_eq!(record.ident().short_number(), 31);
        assert!(record.is_constructed());
        assert_eq!(record.header_len(), 3);
        assert_eq!(record.content().len(), 5);

        let inner: Vec<_> = record.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].tag(), Tag::ctx(0));
        assert_eq!(inner[0].pos().to_usize(), 3);
        let innermost: Vec<_> = inner[0].records().collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(innermost[0].content().as_ref(), b"\x1F");
        assert_eq!(innermost[0].content_pos().to_usize(), 7);
    }

    #[test]
    fn empty_and_zero_length() {
        assert!(take(b"").unwrap().is_none());
        let record = take(b"\x04\x00").unwrap().unwrap();
        assert!(record.content().is_empty());
        assert_eq!(record.full_len(), 2);
    }

    #[test]
    fn truncated_content() {
        let record = take(b"\x04\x05abc").unwrap().unwrap();
        assert!(record.is_truncated());
        assert_eq!(record.content().as_ref(), b"abc");
        assert_eq!(record.full_len(), 5);

        let err = take(b"\x04\x05").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
        assert_eq!(err.pos().to_usize(), 2);

        let record = take(b"\x04\x83\x01").unwrap().unwrap();
        assert!(record.is_truncated());
        assert!(record.content().is_empty());
        assert_eq!(record.full_len(), 3);
    }

    #[test]
    fn header_failures() {
        let err = take(b"\x1F\x81").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TagContinuation);
        assert_eq!(err.pos().to_usize(), 2);
        assert_eq!(take(b"\x04").unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(
            take(b"\x04\xFF").unwrap_err().kind(), ErrorKind::IllegalLength
        );
    }

    #[test]
    fn indefinite_length() {
        let record = take(
            b"\x30\x80\x04\x01a\x30\x80\x04\x00\x00\x00\x00\x00\x05\x00"
        ).unwrap().unwrap();
        assert_eq!(record.header_len(), 2);
        assert_eq!(record.content().as_ref(), b"\x04\x01a\x30\x80\x04\x00\x00\x00");
        assert_eq!(record.trailer(), Some(b"\x00\x00".as_ref()));
        assert_eq!(record.full_len(), 13);

        let inner: Vec<_> = record.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[1].full_len(), 6);
        assert!(inner[1].trailer().is_some());
    }

    #[test]
    fn indefinite_without_marker() {
        let record = take(b"\x30\x80\x04\x01a\x04").unwrap().unwrap();
        assert!(record.trailer().is_none());
        assert_eq!(record.content().as_ref(), b"\x04\x01a\x04");
        assert_eq!(record.full_len(), 6);
    }

    #[test]
    fn indefinite_depth_limit() {
        let data = Bytes::from_static(b"\x30\x80\x30\x80\x30\x80\x00\x00\x00\x00\x00\x00");
        let limits = Limits::default().with_max_depth(2);
        let err = Record::take_opt_from(
            &mut Source::new(data.clone()), &limits
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooDeep(2));
        assert_eq!(err.pos().to_usize(), 6);

        let limits = Limits::default().with_max_depth(3);
        let record = Record::take_opt_from(
            &mut Source::new(data), &limits
        ).unwrap().unwrap();
        assert_eq!(record.full_len(), 12);
    }

    #[test]
    fn indefinite_scan_limit() {
        let data = Bytes::from_static(b"\x30\x80\x04\x02ab\x04\x02cd\x00\x00");
        let limits = Limits::default().with_max_scan(3);
        let err = Record::take_opt_from(
            &mut Source::new(data), &limits
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScanLimit(3));
    }

    #[test]
    fn read_loop() {
        let mut buf = Bytes::from_static(b"\x80\x01\x05\x81\x00\xBF\x1F\x00");
        let mut numbers = Vec::new();
        while let Some((record, rest)) = read(&buf).unwrap() {
            numbers.push(record.number());
            buf = rest;
        }
        assert_eq!(numbers, [0, 1, 31]);
    }

    #[test]
    fn integers() {
        let record = take(b"\x80\x02\x01\x00").unwrap().unwrap();
        assert_eq!(record.to_u16().unwrap(), 256);
        assert_eq!(record.to_u8().unwrap_err().kind(),
            ErrorKind::Malformed("integer does not fit into 8 bits")
        );
        let record = take(b"\x80\x00").unwrap().unwrap();
        assert_eq!(record.to_u8().unwrap(), 0);
    }
}
