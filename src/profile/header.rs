//! Element headers and the profile header.

use std::collections::BTreeSet;
use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{
    EncodeError, PrimitiveContent, Values, iter, sequence_as
};
use crate::ident::{Class, Tag};
use crate::oid::Oid;
use super::extra::{Extra, Seen};


//------------ ElementHeader -------------------------------------------------

/// The header common to all profile elements but the profile header.
///
/// ```text
/// PEHeader ::= SEQUENCE {
///     mandated       [0] NULL OPTIONAL,
///     identification [1] UInt15
/// }
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ElementHeader {
    /// Whether the element is mandatory.
    ///
    /// The content of the marker is ignored.
    pub mandated: bool,

    /// The numeric identification of the element.
    pub identification: Option<u32>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl ElementHeader {
    /// Creates a new header.
    pub fn new(mandated: bool, identification: u32) -> Self {
        ElementHeader {
            mandated,
            identification: Some(identification),
            extra: Extra::new(),
        }
    }

    /// Decodes the header from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => res.mandated = true,
                (Class::Context, 1) if first => {
                    res.identification = Some(item.to_u32()?)
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the header using the given tag.
    pub fn encode_as(&self, tag: Tag) -> impl Values + '_ {
        dcons(tag, (
            self.mandated.then(|| ().encode_as(Tag::ctx(0))),
            self.identification.map(|v| v.encode_as(Tag::ctx(1))),
            &self.extra,
        ))
    }
}


//------------ ProfileHeader -------------------------------------------------

/// The profile header element.
///
/// This is the first element of every profile. It names the version of
/// the interoperable profile format, the ICCID of the profile, and which
/// services the card has to provide.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileHeader {
    /// `[0]` The major version of the format.
    pub major_version: Option<u8>,

    /// `[1]` The minor version of the format.
    pub minor_version: Option<u8>,

    /// `[2]` A free-form profile type.
    pub profile_type: Option<String>,

    /// `[3]` The ICCID in its BCD encoding.
    pub iccid: Option<Bytes>,

    /// `[4]` The profile policy rules.
    pub pol: Option<Bytes>,

    /// `[5]` The tags of the mandatory service markers.
    pub mandatory_services: Option<BTreeSet<Tag>>,

    /// `[6]` The templates of mandatory generic file system elements.
    pub gfste_list: Option<Vec<Oid>>,

    /// `[7]` Connectivity parameters.
    pub connectivity_parameters: Option<Captured>,

    /// `[8]` Mandatory applications.
    pub mandatory_aids: Option<Captured>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl ProfileHeader {
    /// The name of the element used in errors.
    const NAME: &'static str = "ProfileHeader";

    /// Creates a header from the mandatory fields.
    pub fn new(major: u8, minor: u8, iccid: Bytes) -> Self {
        ProfileHeader {
            major_version: Some(major),
            minor_version: Some(minor),
            iccid: Some(iccid),
            .. Default::default()
        }
    }

    /// Decodes the header from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.major_version = Some(item.to_u8()?)
                }
                (Class::Context, 1) if first => {
                    res.minor_version = Some(item.to_u8()?)
                }
                (Class::Context, 2) if first => {
                    res.profile_type = Some(item.to_utf8()?)
                }
                (Class::Context, 3) if first => {
                    res.iccid = Some(item.content().clone())
                }
                (Class::Context, 4) if first => {
                    res.pol = Some(item.content().clone())
                }
                (Class::Context, 5) if first => {
                    let mut services = BTreeSet::new();
                    for service in item.records() {
                        services.insert(service?.tag());
                    }
                    res.mandatory_services = Some(services);
                }
                (Class::Context, 6) if first => {
                    let mut list = Vec::new();
                    for oid in item.records() {
                        list.push(Oid::from_record(&oid?)?);
                    }
                    res.gfste_list = Some(list);
                }
                (Class::Context, 7) if first => {
                    res.connectivity_parameters = Some(item.capture())
                }
                (Class::Context, 8) if first => {
                    res.mandatory_aids = Some(item.capture())
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the header using the given tag.
    ///
    /// Fails if the version or the ICCID are missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let major = self.major_version.ok_or(
            EncodeError::missing(Self::NAME, "major-version")
        )?;
        let minor = self.minor_version.ok_or(
            EncodeError::missing(Self::NAME, "minor-version")
        )?;
        let iccid = self.iccid.as_ref().ok_or(
            EncodeError::missing(Self::NAME, "iccid")
        )?;
        Ok(dcons(tag, (
            major.encode_as(Tag::ctx(0)),
            minor.encode_as(Tag::ctx(1)),
            self.profile_type.as_deref().map(|v| v.encode_as(Tag::ctx(2))),
            prim(Tag::ctx(3), iccid),
            self.pol.as_ref().map(|v| prim(Tag::ctx(4), v)),
            self.mandatory_services.as_ref().map(|services| {
                dcons(Tag::ctx(5), iter(
                    services.iter().map(|tag| ().encode_as(*tag))
                ))
            }),
            self.gfste_list.as_ref().map(|list| {
                sequence_as(Tag::ctx(6), iter(
                    list.iter().map(|oid| oid.encode())
                ))
            }),
            &self.connectivity_parameters,
            &self.mandatory_aids,
            &self.extra,
        )))
    }
}


//------------ End -----------------------------------------------------------

/// The end element.
///
/// This is the last element of every profile.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct End {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl End {
    /// Creates an end element with the given header.
    pub fn new(header: ElementHeader) -> Self {
        End { header, extra: Extra::new() }
    }

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
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the element using the given tag.
    pub fn encode_as(&self, tag: Tag) -> impl Values + '_ {
        dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            &self.extra,
        ))
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

    #[test]
    fn element_header() {
        let header = ElementHeader::from_record(
            &record(b"\xA0\x05\x80\x00\x81\x01\x07")
        ).unwrap();
        assert!(header.mandated);
        assert_eq!(header.identification, Some(7));
        assert_eq!(
            header.encode_as(Tag::ctx(0)).to_vec(),
            b"\xA0\x05\x80\x00\x81\x01\x07"
        );

        let header = ElementHeader::from_record(
            &record(b"\xA0\x06\x81\x01\x01\x9F\x40\x00")
        ).unwrap();
        assert!(!header.mandated);
        assert_eq!(header.extra.len(), 1);
        assert_eq!(
            header.encode_as(Tag::ctx(0)).to_vec(),
            b"\xA0\x06\x81\x01\x01\x9F\x40\x00"
        );
    }

    #[test]
    fn profile_header_fields() {
        let data = b"\
            \xA0\x28\
                \x80\x01\x02\x81\x01\x03\
                \x82\x04test\
                \x83\x0A\x89\x01\x02\x03\x04\x05\x06\x07\x08\x09\
                \xA5\x04\x81\x00\x84\x00\
                \xA6\x08\x06\x06\x67\x81\x0F\x01\x02\x01\
        ";
        let header = ProfileHeader::from_record(&record(data)).unwrap();
        assert_eq!(header.major_version, Some(2));
        assert_eq!(header.minor_version, Some(3));
        assert_eq!(header.profile_type.as_deref(), Some("test"));
        assert_eq!(header.iccid.as_ref().map(|v| v.len()), Some(10));
        assert_eq!(
            header.mandatory_services.as_ref().map(|s| s.len()), Some(2)
        );
        assert_eq!(
            header.gfste_list.as_ref().unwrap()[0].to_string(),
            "2.23.143.1.2.1"
        );
        assert_eq!(
            header.encode_as(Tag::ctx(0)).unwrap().to_vec(), &data[..]
        );
    }

    #[test]
    fn profile_header_ordering() {
        let mut header = ProfileHeader::default();
        header.pol = Some(Bytes::from_static(b"\x01"));
        header.iccid = Some(Bytes::from_static(b"\x98\x10"));
        header.minor_version = Some(1);
        header.major_version = Some(2);
        assert_eq!(
            header.encode_as(Tag::ctx(0)).unwrap().to_vec(),
            b"\xA0\x0D\x80\x01\x02\x81\x01\x01\x83\x02\x98\x10\x84\x01\x01"
        );
    }

    #[test]
    fn profile_header_repeated_field() {
        let data = b"\
            \xA0\x0C\
                \x80\x01\x02\x80\x01\x05\x81\x01\x03\x83\x01\x99\
        ";
        let header = ProfileHeader::from_record(&record(data)).unwrap();
        assert_eq!(header.major_version, Some(2));
        assert_eq!(header.extra.len(), 1);

        // The second major version moves behind the known fields.
        let encoded = header.encode_as(Tag::ctx(0)).unwrap().to_vec();
        assert_eq!(
            encoded,
            b"\xA0\x0C\x80\x01\x02\x81\x01\x03\x83\x01\x99\x80\x01\x05"
        );
        let encoded = Bytes::from(encoded);
        let record = Record::take_from(
            &mut Source::new(encoded), &Limits::default()
        ).unwrap();
        assert_eq!(ProfileHeader::from_record(&record).unwrap(), header);
    }

    #[test]
    fn profile_header_missing() {
        let header = ProfileHeader {
            major_version: Some(2),
            minor_version: Some(3),
            .. Default::default()
        };
        assert_eq!(
            header.encode_as(Tag::ctx(0)).err(),
            Some(EncodeError::missing("ProfileHeader", "iccid"))
        );
    }

    #[test]
    fn end() {
        let data = b"\xBF\x3F\x05\xA0\x03\x81\x01\x1F";
        let end = End::from_record(&record(data)).unwrap();
        assert_eq!(end.header.identification, Some(31));
        assert_eq!(end.encode_as(Tag::ctx(63)).to_vec(), &data[..]);
    }
}
