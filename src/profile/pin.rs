//! PIN and PUK code elements.

use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{
    Choice2, EncodeError, PrimitiveContent, Values, iter, sequence
};
use crate::ident::{Class, Tag};
use super::extra::{Extra, Seen};
use super::header::ElementHeader;


//------------ PinConfig -----------------------------------------------------

/// The configuration of a single PIN.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PinConfig {
    /// `[0]` The key reference of the PIN.
    pub key_reference: Option<u8>,

    /// `[1]` The initial PIN value.
    pub pin_value: Option<Bytes>,

    /// `[2]` The key reference of the PUK unblocking the PIN.
    pub unblocking_reference: Option<u8>,

    /// `[3]` The PIN attributes.
    pub attributes: Option<u8>,

    /// `[4]` Maximum attempts in the upper and attempts left in the lower
    /// nibble.
    pub max_attempts: Option<u8>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl PinConfig {
    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.key_reference = Some(item.to_u8()?)
                }
                (Class::Context, 1) if first => {
                    res.pin_value = Some(item.content().clone())
                }
                (Class::Context, 2) if first => {
                    res.unblocking_reference = Some(item.to_u8()?)
                }
                (Class::Context, 3) if first => {
                    res.attributes = Some(item.to_u8()?)
                }
                (Class::Context, 4) if first => {
                    res.max_attempts = Some(item.to_u8()?)
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    fn check(&self) -> Result<(), EncodeError> {
        if self.key_reference.is_none() {
            return Err(EncodeError::missing(PinCodes::NAME, "keyReference"))
        }
        if self.pin_value.is_none() {
            return Err(EncodeError::missing(PinCodes::NAME, "pinValue"))
        }
        Ok(())
    }

    fn encode(&self) -> impl Values + '_ {
        sequence((
            self.key_reference.map(|v| v.encode_as(Tag::ctx(0))),
            self.pin_value.as_ref().map(|v| prim(Tag::ctx(1), v)),
            self.unblocking_reference.map(|v| v.encode_as(Tag::ctx(2))),
            self.attributes.map(|v| v.encode_as(Tag::ctx(3))),
            self.max_attempts.map(|v| v.encode_as(Tag::ctx(4))),
            &self.extra,
        ))
    }
}


//------------ PinSource -----------------------------------------------------

/// Where the PINs of a PIN codes element come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PinSource {
    /// `[0]` A list of PIN configurations.
    Configs(Vec<PinConfig>),

    /// `[1]` The path of a file to take the PINs from.
    FilePath(Bytes),

    /// Any other choice, kept verbatim.
    Other(Captured),
}

impl PinSource {
    /// Decodes the choice from the `[1]` record of the element.
    ///
    /// Records following the choice are added to `trailing`.
    fn from_record(
        record: &Record, trailing: &mut Extra
    ) -> Result<Option<Self>, DecodeError> {
        let mut records = record.records();
        let choice = match records.next() {
            Some(choice) => choice?,
            None => return Ok(None)
        };
        for item in records {
            trailing.push(item?.capture());
        }
        Ok(Some(match (choice.tag().class(), choice.number()) {
            (Class::Context, 0) => {
                let mut configs = Vec::new();
                for item in choice.records() {
                    configs.push(PinConfig::from_record(&item?)?);
                }
                PinSource::Configs(configs)
            }
            (Class::Context, 1) => {
                PinSource::FilePath(choice.content().clone())
            }
            _ => PinSource::Other(choice.capture())
        }))
    }

    fn encode(&self) -> impl Values + '_ {
        match self {
            PinSource::Configs(configs) => Choice2::One(dcons(
                Tag::ctx(0), iter(configs.iter().map(PinConfig::encode))
            )),
            PinSource::FilePath(path) => {
                Choice2::Two(Choice2::One(prim(Tag::ctx(1), path)))
            }
            PinSource::Other(inner) => Choice2::Two(Choice2::Two(inner)),
        }
    }
}


//------------ PinCodes ------------------------------------------------------

/// The PIN codes element.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PinCodes {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The PINs.
    pub codes: Option<PinSource>,

    /// Records following the choice within `[1]`.
    pub codes_extra: Extra,

    /// Unknown records of the element.
    pub extra: Extra,
}

impl PinCodes {
    const NAME: &'static str = "PinCodes";

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
                    res.codes = PinSource::from_record(
                        &item, &mut res.codes_extra
                    )?
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns the PIN configurations if they are given in the element.
    pub fn configs(&self) -> &[PinConfig] {
        match self.codes {
            Some(PinSource::Configs(ref configs)) => configs,
            _ => &[]
        }
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the PINs or the mandatory fields of a configuration are
    /// missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let codes = self.codes.as_ref().ok_or(
            EncodeError::missing(Self::NAME, "pinCodes")
        )?;
        self.configs().iter().try_for_each(PinConfig::check)?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            dcons(Tag::ctx(1), (codes.encode(), &self.codes_extra)),
            &self.extra,
        )))
    }
}


//------------ PukConfig -----------------------------------------------------

/// The configuration of a single PUK.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PukConfig {
    /// `[0]` The key reference of the PUK.
    pub key_reference: Option<u8>,

    /// `[1]` The initial PUK value.
    pub puk_value: Option<Bytes>,

    /// `[2]` Maximum attempts in the upper and attempts left in the lower
    /// nibble.
    pub max_attempts: Option<u8>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl PukConfig {
    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.key_reference = Some(item.to_u8()?)
                }
                (Class::Context, 1) if first => {
                    res.puk_value = Some(item.content().clone())
                }
                (Class::Context, 2) if first => {
                    res.max_attempts = Some(item.to_u8()?)
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    fn check(&self) -> Result<(), EncodeError> {
        if self.key_reference.is_none() {
            return Err(EncodeError::missing(PukCodes::NAME, "keyReference"))
        }
        if self.puk_value.is_none() {
            return Err(EncodeError::missing(PukCodes::NAME, "pukValue"))
        }
        Ok(())
    }

    fn encode(&self) -> impl Values + '_ {
        sequence((
            self.key_reference.map(|v| v.encode_as(Tag::ctx(0))),
            self.puk_value.as_ref().map(|v| prim(Tag::ctx(1), v)),
            self.max_attempts.map(|v| v.encode_as(Tag::ctx(2))),
            &self.extra,
        ))
    }
}


//------------ PukCodes ------------------------------------------------------

/// The PUK codes element.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PukCodes {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The PUKs.
    pub codes: Vec<PukConfig>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl PukCodes {
    const NAME: &'static str = "PukCodes";

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
                    for code in item.records() {
                        res.codes.push(PukConfig::from_record(&code?)?);
                    }
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the mandatory fields of a configuration are missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        self.codes.iter().try_for_each(PukConfig::check)?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            dcons(Tag::ctx(1), iter(self.codes.iter().map(PukConfig::encode))),
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

    const PIN_CODES: &[u8] = b"\
        \xA2\x29\
            \xA0\x05\x80\x00\x81\x01\x03\
            \xA1\x20\xA0\x1E\
                \x30\x10\x80\x01\x01\x81\x08\x31\x32\x33\x34\xFF\xFF\xFF\xFF\
                    \x82\x01\x02\
                \x30\x0A\x80\x01\x81\x81\x02\x31\x32\x84\x01\x33\
    ";

    #[test]
    fn pin_codes() {
        let pins = PinCodes::from_record(&record(PIN_CODES)).unwrap();
        assert_eq!(pins.header.identification, Some(3));
        let configs = pins.configs();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].key_reference, Some(1));
        assert_eq!(configs[0].unblocking_reference, Some(2));
        assert_eq!(configs[1].key_reference, Some(0x81));
        assert_eq!(configs[1].max_attempts, Some(0x33));
        assert_eq!(
            pins.encode_as(Tag::ctx(2)).unwrap().to_vec(), PIN_CODES
        );
    }

    #[test]
    fn pin_file_path() {
        let data = b"\xA2\x0B\xA0\x00\xA1\x07\x81\x05\x3F\x00\x7F\xFF\x01";
        let pins = PinCodes::from_record(&record(data)).unwrap();
        assert!(pins.configs().is_empty());
        assert_eq!(
            pins.codes,
            Some(PinSource::FilePath(
                Bytes::from_static(b"\x3F\x00\x7F\xFF\x01")
            ))
        );
        assert_eq!(pins.encode_as(Tag::ctx(2)).unwrap().to_vec(), data);
    }

    #[test]
    fn pin_choice_leftovers() {
        let data = b"\xA2\x0A\xA0\x00\xA1\x06\xA0\x00\x81\x02\xAB\xCD";
        let pins = PinCodes::from_record(&record(data)).unwrap();
        assert_eq!(pins.codes, Some(PinSource::Configs(Vec::new())));
        assert_eq!(pins.codes_extra.len(), 1);
        assert_eq!(pins.encode_as(Tag::ctx(2)).unwrap().to_vec(), data);

        let data = b"\xA2\x07\xA0\x00\xA1\x03\xC1\x01\x05";
        let pins = PinCodes::from_record(&record(data)).unwrap();
        assert!(matches!(pins.codes, Some(PinSource::Other(_))));
        assert_eq!(pins.encode_as(Tag::ctx(2)).unwrap().to_vec(), data);
    }

    #[test]
    fn pin_missing_value() {
        let pins = PinCodes {
            codes: Some(PinSource::Configs(vec![PinConfig {
                key_reference: Some(1),
                .. Default::default()
            }])),
            .. Default::default()
        };
        assert_eq!(
            pins.encode_as(Tag::ctx(2)).err(),
            Some(EncodeError::missing("PinCodes", "pinValue"))
        );
        assert_eq!(
            PinCodes::default().encode_as(Tag::ctx(2)).err(),
            Some(EncodeError::missing("PinCodes", "pinCodes"))
        );
    }

    #[test]
    fn puk_codes() {
        let data = b"\
            \xA3\x16\
                \xA0\x03\x81\x01\x04\
                \xA1\x0F\
                    \x30\x0D\x80\x01\x01\x81\x08\x31\x32\x33\x34\x35\x36\x37\x38\
        ";
        let puks = PukCodes::from_record(&record(data)).unwrap();
        assert_eq!(puks.codes.len(), 1);
        assert_eq!(puks.codes[0].puk_value.as_deref(), Some(&b"12345678"[..]));
        assert_eq!(puks.encode_as(Tag::ctx(3)).unwrap().to_vec(), data);
    }
}
