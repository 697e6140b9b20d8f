//! Authentication parameter elements.

use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{EncodeError, PrimitiveContent, Values, iter};
use crate::ident::{Class, Tag};
use super::extra::{Extra, Seen};
use super::header::ElementHeader;


//------------ Algorithm -----------------------------------------------------

/// The choice of the network authentication algorithm.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    /// `[0]` Milenage.
    Milenage,

    /// `[1]` TUAK.
    Tuak,

    /// `[2]` The test algorithm.
    Test,

    /// Any other choice, identified by its tag.
    Other(Tag),
}

impl Algorithm {
    /// Returns the algorithm for the tag of the choice.
    ///
    /// Only context specific tags select one of the known algorithms.
    pub fn from_tag(tag: Tag) -> Self {
        match (tag.class(), tag.number()) {
            (Class::Context, 0) => Algorithm::Milenage,
            (Class::Context, 1) => Algorithm::Tuak,
            (Class::Context, 2) => Algorithm::Test,
            _ => Algorithm::Other(tag)
        }
    }

    /// Returns the tag of the choice.
    pub fn tag(self) -> Tag {
        match self {
            Algorithm::Milenage => Tag::ctx(0),
            Algorithm::Tuak => Tag::ctx(1),
            Algorithm::Test => Tag::ctx(2),
            Algorithm::Other(tag) => tag,
        }
    }
}


//------------ AlgoConfiguration ---------------------------------------------

/// The configuration of the authentication algorithm.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlgoConfiguration {
    /// The algorithm chosen.
    pub algorithm: Algorithm,

    /// `[0]` The algorithm identifier.
    pub algorithm_id: Option<u8>,

    /// `[1]` Algorithm options.
    pub algorithm_options: Option<Bytes>,

    /// `[2]` The subscriber key.
    pub key: Option<Bytes>,

    /// `[3]` The operator variant key.
    pub opc: Option<Bytes>,

    /// `[4]` Milenage rotation constants.
    pub rotation_constants: Option<Bytes>,

    /// `[5]` Milenage XOR constants.
    pub xoring_constants: Option<Bytes>,

    /// `[6]` The number of Keccak iterations for TUAK.
    pub number_of_keccak: Option<u8>,

    /// Unknown records within the choice.
    pub extra: Extra,

    /// Records following the choice within `[1]`.
    pub choice_extra: Extra,
}

impl AlgoConfiguration {
    /// Creates an empty configuration for the given algorithm.
    pub fn new(algorithm: Algorithm) -> Self {
        AlgoConfiguration {
            algorithm,
            algorithm_id: None,
            algorithm_options: None,
            key: None,
            opc: None,
            rotation_constants: None,
            xoring_constants: None,
            number_of_keccak: None,
            extra: Extra::new(),
            choice_extra: Extra::new(),
        }
    }

    /// Decodes the configuration from the `[1]` record of the element.
    ///
    /// The record wraps a single choice record. Returns `Ok(None)` if
    /// that is missing. Any records after the choice are kept.
    fn from_record(record: &Record) -> Result<Option<Self>, DecodeError> {
        let mut records = record.records();
        let choice = match records.next() {
            Some(choice) => choice?,
            None => return Ok(None)
        };
        let mut res = Self::new(Algorithm::from_tag(choice.tag()));
        for item in records {
            res.choice_extra.push(item?.capture());
        }
        let mut seen = Seen::new();
        for item in choice.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.algorithm_id = Some(item.to_u8()?)
                }
                (Class::Context, 1) if first => {
                    res.algorithm_options = Some(item.content().clone())
                }
                (Class::Context, 2) if first => {
                    res.key = Some(item.content().clone())
                }
                (Class::Context, 3) if first => {
                    res.opc = Some(item.content().clone())
                }
                (Class::Context, 4) if first => {
                    res.rotation_constants = Some(item.content().clone())
                }
                (Class::Context, 5) if first => {
                    res.xoring_constants = Some(item.content().clone())
                }
                (Class::Context, 6) if first => {
                    res.number_of_keccak = Some(item.to_u8()?)
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(Some(res))
    }

    fn check(&self) -> Result<(), EncodeError> {
        let missing = |field| {
            Err(EncodeError::missing(AkaParameter::NAME, field))
        };
        if self.algorithm_id.is_none() {
            return missing("algorithmID")
        }
        if self.algorithm_options.is_none() {
            return missing("algorithmOptions")
        }
        if self.key.is_none() {
            return missing("key")
        }
        if self.opc.is_none() {
            return missing("opc")
        }
        Ok(())
    }

    fn encode(&self) -> impl Values + '_ {
        dcons(Tag::ctx(1), (dcons(self.algorithm.tag(), (
            self.algorithm_id.map(|v| v.encode_as(Tag::ctx(0))),
            self.algorithm_options.as_ref().map(|v| prim(Tag::ctx(1), v)),
            self.key.as_ref().map(|v| prim(Tag::ctx(2), v)),
            self.opc.as_ref().map(|v| prim(Tag::ctx(3), v)),
            self.rotation_constants.as_ref().map(|v| prim(Tag::ctx(4), v)),
            self.xoring_constants.as_ref().map(|v| prim(Tag::ctx(5), v)),
            self.number_of_keccak.map(|v| v.encode_as(Tag::ctx(6))),
            &self.extra,
        )), &self.choice_extra))
    }
}


//------------ AkaParameter --------------------------------------------------

/// The AKA parameter element.
///
/// This configures the network authentication algorithm and the sequence
/// number handling of the USIM.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AkaParameter {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The algorithm configuration.
    pub algo: Option<AlgoConfiguration>,

    /// `[2]` Sequence number options.
    pub sqn_options: Option<Bytes>,

    /// `[3]` The sequence number delta.
    pub sqn_delta: Option<Bytes>,

    /// `[4]` The sequence number age limit.
    pub sqn_age_limit: Option<Bytes>,

    /// `[5]` The initial sequence numbers.
    pub sqn_init: Option<Vec<Bytes>>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl AkaParameter {
    const NAME: &'static str = "AkaParameter";

    /// Decodes the element from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.header = ElementHeader::from_record(&item)?
                }
                (Class::Context, 1) if first => {
                    res.algo = AlgoConfiguration::from_record(&item)?
                }
                (Class::Context, 2) if first => {
                    res.sqn_options = Some(item.content().clone())
                }
                (Class::Context, 3) if first => {
                    res.sqn_delta = Some(item.content().clone())
                }
                (Class::Context, 4) if first => {
                    res.sqn_age_limit = Some(item.content().clone())
                }
                (Class::Context, 5) if first => {
                    let mut list = Vec::new();
                    for sqn in item.records() {
                        list.push(sqn?.content().clone());
                    }
                    res.sqn_init = Some(list);
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the algorithm configuration or one of its mandatory fields
    /// are missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let algo = self.algo.as_ref().ok_or(
            EncodeError::missing(Self::NAME, "algoConfiguration")
        )?;
        algo.check()?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            algo.encode(),
            self.sqn_options.as_ref().map(|v| prim(Tag::ctx(2), v)),
            self.sqn_delta.as_ref().map(|v| prim(Tag::ctx(3), v)),
            self.sqn_age_limit.as_ref().map(|v| prim(Tag::ctx(4), v)),
            self.sqn_init.as_ref().map(|list| {
                dcons(Tag::ctx(5), iter(
                    list.iter().map(|v| prim(Tag::OCTET_STRING, v))
                ))
            }),
            &self.extra,
        )))
    }
}


//------------ CdmaParameter -------------------------------------------------

/// The CDMA parameter element.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CdmaParameter {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The authentication key.
    pub authentication_key: Option<Bytes>,

    /// `[2]` Shared secret data.
    pub ssd: Option<Bytes>,

    /// `[3]` HRPD access authentication data.
    pub hrpd_access_authentication_data: Option<Bytes>,

    /// `[4]` Simple IP authentication data.
    pub simple_ip_authentication_data: Option<Captured>,

    /// `[5]` Mobile IP authentication data.
    pub mobile_ip_authentication_data: Option<Captured>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl CdmaParameter {
    const NAME: &'static str = "CdmaParameter";

    /// Decodes the element from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.header = ElementHeader::from_record(&item)?
                }
                (Class::Context, 1) if first => {
                    res.authentication_key = Some(item.content().clone())
                }
                (Class::Context, 2) if first => {
                    res.ssd = Some(item.content().clone())
                }
                (Class::Context, 3) if first => {
                    res.hrpd_access_authentication_data = Some(
                        item.content().clone()
                    )
                }
                (Class::Context, 4) if first => {
                    res.simple_ip_authentication_data = Some(item.capture())
                }
                (Class::Context, 5) if first => {
                    res.mobile_ip_authentication_data = Some(item.capture())
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the authentication key is missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let key = self.authentication_key.as_ref().ok_or(
            EncodeError::missing(Self::NAME, "authenticationKey")
        )?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            prim(Tag::ctx(1), key),
            self.ssd.as_ref().map(|v| prim(Tag::ctx(2), v)),
            self.hrpd_access_authentication_data.as_ref().map(|v| {
                prim(Tag::ctx(3), v)
            }),
            &self.simple_ip_authentication_data,
            &self.mobile_ip_authentication_data,
            &self.extra,
        )))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::decode::Source;
    use crate::limits::Limits;
    use super::*;

    fn record(data: &'static [u8]) -> Record {
        Record::take_from(
            &mut Source::new(Bytes::from_static(data)), &Limits::default()
        ).unwrap()
    }

    const KEY: &[u8] = b"\x00\x11\x22\x33\x44\x55\x66\x77\
                         \x88\x99\xAA\xBB\xCC\xDD\xEE\xFF";

    fn milenage() -> AkaParameter {
        let mut algo = AlgoConfiguration::new(Algorithm::Milenage);
        algo.algorithm_id = Some(1);
        algo.algorithm_options = Some(Bytes::from_static(b"\x00"));
        algo.key = Some(Bytes::from_static(KEY));
        algo.opc = Some(Bytes::from_static(KEY));
        AkaParameter {
            header: ElementHeader::new(true, 9),
            algo: Some(algo),
            sqn_init: Some(vec![Bytes::from_static(&[0; 6]); 2]),
            .. Default::default()
        }
    }

    #[test]
    fn aka_round_trip() {
        let aka = milenage();
        let encoded = aka.encode_as(Tag::ctx(22)).unwrap().to_vec();
        assert_eq!(&encoded[..2], b"\xB6\x47");
        assert_eq!(&encoded[9..13], b"\xA1\x2C\xA0\x2A");

        let data = Bytes::from(encoded);
        let record = Record::take_from(
            &mut Source::new(data), &Limits::default()
        ).unwrap();
        assert_eq!(AkaParameter::from_record(&record).unwrap(), aka);
    }

    #[test]
    fn aka_missing_key() {
        let mut aka = milenage();
        if let Some(algo) = aka.algo.as_mut() {
            algo.key = None;
        }
        assert_eq!(
            aka.encode_as(Tag::ctx(22)).err(),
            Some(EncodeError::missing("AkaParameter", "key"))
        );
    }

    #[test]
    fn aka_other_choice() {
        let data = b"\
            \xB6\x15\
                \xA0\x00\
                \xA1\x11\
                    \xE0\x0C\
                        \x80\x01\x01\x81\x01\x00\
                        \x82\x01\xAA\x83\x01\xBB\
                    \x84\x01\x07\
        ";
        let aka = AkaParameter::from_record(&record(data)).unwrap();
        let algo = aka.algo.as_ref().unwrap();
        assert_eq!(algo.algorithm, Algorithm::Other(Tag::private(0)));
        assert_eq!(algo.key.as_deref(), Some(&b"\xAA"[..]));
        assert_eq!(algo.choice_extra.len(), 1);
        assert_eq!(aka.encode_as(Tag::ctx(22)).unwrap().to_vec(), data);
    }

    #[test]
    fn cdma() {
        let data = b"\
            \xB7\x11\
                \xA0\x00\
                \x81\x02\x01\x02\
                \x83\x01\x03\
                \xA5\x03\x80\x01\x04\
                \x9F\x20\x00\
        ";
        let cdma = CdmaParameter::from_record(&record(data)).unwrap();
        assert!(cdma.ssd.is_none());
        assert!(cdma.mobile_ip_authentication_data.is_some());
        assert_eq!(cdma.extra.len(), 1);
        assert_eq!(cdma.encode_as(Tag::ctx(23)).unwrap().to_vec(), data);
    }
}
