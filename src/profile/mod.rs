//! Profiles and their elements.
//!
//! A profile is a sequence of profile elements, each one a constructed
//! record with a context specific tag that selects the kind of element.
//! There is no envelope around the sequence.
//!
//! Decoding a profile keeps the exact octets of each element next to its
//! decoded value. Encoding an element that hasn’t been touched simply
//! writes out these octets again, so an untouched profile survives a round
//! trip unchanged. Once an element is changed via [`Profile::element_mut`]
//! or [`ProfileElement::value_mut`], its octets are dropped and encoding
//! produces the element from its value instead.
//!
//! The values of the elements are represented by the types in this module.
//! Each of them keeps inner records it doesn’t know in an [`Extra`] so
//! that nothing is lost when a profile is edited.

pub use self::aka::{AkaParameter, AlgoConfiguration, Algorithm, CdmaParameter};
pub use self::app::{Application, ApplicationInstance, LoadBlock};
pub use self::extra::Extra;
pub use self::file::{ElementaryFile, FileDescriptor, FileItem, FileSystem};
pub use self::gfm::{FileCommand, GenericFileManagement};
pub use self::header::{ElementHeader, End, ProfileHeader};
pub use self::pin::{PinCodes, PinConfig, PinSource, PukCodes, PukConfig};
pub use self::sd::{KeyComponent, KeyObject, Rfm, SecurityDomain};

use std::{fmt, ops, slice};
use bytes::Bytes;
use log::{debug, trace, warn};
use crate::captured::Captured;
use crate::decode::{DecodeError, ErrorKind, Record, Source};
use crate::encode::{EncodeError, Values, infallible};
use crate::ident::{Class, Tag};
use crate::limits::Limits;

mod aka;
mod app;
mod extra;
mod file;
mod gfm;
mod header;
mod pin;
mod sd;

#[cfg(test)]
mod test;


//------------ Kind ----------------------------------------------------------

/// The kind of a profile element.
///
/// Each kind but [`Kind::Unknown`] has a fixed tag number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    /// `[0]` The profile header.
    Header,
    /// `[1]` The master file.
    MasterFile,
    /// `[2]` The PIN codes.
    PinCodes,
    /// `[3]` The PUK codes.
    PukCodes,
    /// `[4]` The telecom directory.
    Telecom,
    /// `[8]` The USIM application.
    Usim,
    /// `[9]` Optional files of the USIM application.
    OptUsim,
    /// `[10]` The ISIM application.
    Isim,
    /// `[11]` Optional files of the ISIM application.
    OptIsim,
    /// `[12]` The CSIM application.
    Csim,
    /// `[13]` Optional files of the CSIM application.
    OptCsim,
    /// `[20]` The GSM access directory.
    GsmAccess,
    /// `[22]` The AKA parameters.
    AkaParameter,
    /// `[23]` The CDMA parameters.
    CdmaParameter,
    /// `[24]` The 5GS directory.
    Df5gs,
    /// `[25]` The SAIP directory.
    DfSaip,
    /// `[26]` Generic file management commands.
    GenericFileManagement,
    /// `[55]` A security domain.
    SecurityDomain,
    /// `[56]` Remote file management settings.
    Rfm,
    /// `[57]` An application.
    Application,
    /// `[63]` The end of the profile.
    End,

    /// An element with a tag number not listed above.
    Unknown,
}

impl Kind {
    /// All kinds with a tag number in ascending tag order.
    pub const ALL: [Kind; 21] = [
        Kind::Header, Kind::MasterFile, Kind::PinCodes, Kind::PukCodes,
        Kind::Telecom, Kind::Usim, Kind::OptUsim, Kind::Isim, Kind::OptIsim,
        Kind::Csim, Kind::OptCsim, Kind::GsmAccess, Kind::AkaParameter,
        Kind::CdmaParameter, Kind::Df5gs, Kind::DfSaip,
        Kind::GenericFileManagement, Kind::SecurityDomain, Kind::Rfm,
        Kind::Application, Kind::End,
    ];

    /// Returns the kind for an element tag number.
    pub fn from_tag(number: u32) -> Self {
        match number {
            0 => Kind::Header,
            1 => Kind::MasterFile,
            2 => Kind::PinCodes,
            3 => Kind::PukCodes,
            4 => Kind::Telecom,
            8 => Kind::Usim,
            9 => Kind::OptUsim,
            10 => Kind::Isim,
            11 => Kind::OptIsim,
            12 => Kind::Csim,
            13 => Kind::OptCsim,
            20 => Kind::GsmAccess,
            22 => Kind::AkaParameter,
            23 => Kind::CdmaParameter,
            24 => Kind::Df5gs,
            25 => Kind::DfSaip,
            26 => Kind::GenericFileManagement,
            55 => Kind::SecurityDomain,
            56 => Kind::Rfm,
            57 => Kind::Application,
            63 => Kind::End,
            _ => Kind::Unknown,
        }
    }

    /// Returns the tag number of the kind.
    pub fn tag(self) -> Option<u32> {
        match self {
            Kind::Header => Some(0),
            Kind::MasterFile => Some(1),
            Kind::PinCodes => Some(2),
            Kind::PukCodes => Some(3),
            Kind::Telecom => Some(4),
            Kind::Usim => Some(8),
            Kind::OptUsim => Some(9),
            Kind::Isim => Some(10),
            Kind::OptIsim => Some(11),
            Kind::Csim => Some(12),
            Kind::OptCsim => Some(13),
            Kind::GsmAccess => Some(20),
            Kind::AkaParameter => Some(22),
            Kind::CdmaParameter => Some(23),
            Kind::Df5gs => Some(24),
            Kind::DfSaip => Some(25),
            Kind::GenericFileManagement => Some(26),
            Kind::SecurityDomain => Some(55),
            Kind::Rfm => Some(56),
            Kind::Application => Some(57),
            Kind::End => Some(63),
            Kind::Unknown => None,
        }
    }

    /// Returns the name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Header => "ProfileHeader",
            Kind::MasterFile => "MasterFile",
            Kind::PinCodes => "PinCodes",
            Kind::PukCodes => "PukCodes",
            Kind::Telecom => "Telecom",
            Kind::Usim => "USIM",
            Kind::OptUsim => "OptUSIM",
            Kind::Isim => "ISIM",
            Kind::OptIsim => "OptISIM",
            Kind::Csim => "CSIM",
            Kind::OptCsim => "OptCSIM",
            Kind::GsmAccess => "GSMAccess",
            Kind::AkaParameter => "AkaParameter",
            Kind::CdmaParameter => "CdmaParameter",
            Kind::Df5gs => "DF-5GS",
            Kind::DfSaip => "DF-SAIP",
            Kind::GenericFileManagement => "GenericFileManagement",
            Kind::SecurityDomain => "SecurityDomain",
            Kind::Rfm => "RFM",
            Kind::Application => "Application",
            Kind::End => "End",
            Kind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}


//------------ ElementValue --------------------------------------------------

/// The value of a profile element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ElementValue {
    /// `[0]` The profile header.
    Header(ProfileHeader),
    /// `[1]` The master file.
    MasterFile(FileSystem),
    /// `[2]` The PIN codes.
    PinCodes(PinCodes),
    /// `[3]` The PUK codes.
    PukCodes(PukCodes),
    /// `[4]` The telecom directory.
    Telecom(FileSystem),
    /// `[8]` The USIM application.
    Usim(FileSystem),
    /// `[9]` Optional files of the USIM application.
    OptUsim(FileSystem),
    /// `[10]` The ISIM application.
    Isim(FileSystem),
    /// `[11]` Optional files of the ISIM application.
    OptIsim(FileSystem),
    /// `[12]` The CSIM application.
    Csim(FileSystem),
    /// `[13]` Optional files of the CSIM application.
    OptCsim(FileSystem),
    /// `[20]` The GSM access directory.
    GsmAccess(FileSystem),
    /// `[22]` The AKA parameters.
    AkaParameter(AkaParameter),
    /// `[23]` The CDMA parameters.
    CdmaParameter(CdmaParameter),
    /// `[24]` The 5GS directory.
    Df5gs(FileSystem),
    /// `[25]` The SAIP directory.
    DfSaip(FileSystem),
    /// `[26]` Generic file management commands.
    GenericFileManagement(GenericFileManagement),
    /// `[55]` A security domain.
    SecurityDomain(SecurityDomain),
    /// `[56]` Remote file management settings.
    Rfm(Rfm),
    /// `[57]` An application.
    Application(Application),
    /// `[63]` The end of the profile.
    End(End),

    /// An element of unknown kind.
    ///
    /// This also covers records that aren’t constructed or have a class
    /// other than context specific. The complete record is kept and
    /// written back as is.
    Unknown(Captured),
}

impl ElementValue {
    /// Decodes the value of an element with the given tag number.
    ///
    /// The content of `record` is decoded according to `tag`, the tag of
    /// the record itself is ignored. If `tag` doesn’t belong to a known
    /// kind, the complete record is kept.
    pub fn decode(tag: u32, record: &Record) -> Result<Self, DecodeError> {
        use self::ElementValue::*;

        let fs = || FileSystem::from_record(record);
        Ok(match Kind::from_tag(tag) {
            Kind::Header => Header(ProfileHeader::from_record(record)?),
            Kind::MasterFile => MasterFile(fs()?),
            Kind::PinCodes => PinCodes(self::PinCodes::from_record(record)?),
            Kind::PukCodes => PukCodes(self::PukCodes::from_record(record)?),
            Kind::Telecom => Telecom(fs()?),
            Kind::Usim => Usim(fs()?),
            Kind::OptUsim => OptUsim(fs()?),
            Kind::Isim => Isim(fs()?),
            Kind::OptIsim => OptIsim(fs()?),
            Kind::Csim => Csim(fs()?),
            Kind::OptCsim => OptCsim(fs()?),
            Kind::GsmAccess => GsmAccess(fs()?),
            Kind::AkaParameter => {
                AkaParameter(self::AkaParameter::from_record(record)?)
            }
            Kind::CdmaParameter => {
                CdmaParameter(self::CdmaParameter::from_record(record)?)
            }
            Kind::Df5gs => Df5gs(fs()?),
            Kind::DfSaip => DfSaip(fs()?),
            Kind::GenericFileManagement => {
                GenericFileManagement(
                    self::GenericFileManagement::from_record(record)?
                )
            }
            Kind::SecurityDomain => {
                SecurityDomain(self::SecurityDomain::from_record(record)?)
            }
            Kind::Rfm => Rfm(self::Rfm::from_record(record)?),
            Kind::Application => {
                Application(self::Application::from_record(record)?)
            }
            Kind::End => End(self::End::from_record(record)?),
            Kind::Unknown => Unknown(record.capture()),
        })
    }

    /// Returns the kind of the value.
    pub fn kind(&self) -> Kind {
        match self {
            ElementValue::Header(_) => Kind::Header,
            ElementValue::MasterFile(_) => Kind::MasterFile,
            ElementValue::PinCodes(_) => Kind::PinCodes,
            ElementValue::PukCodes(_) => Kind::PukCodes,
            ElementValue::Telecom(_) => Kind::Telecom,
            ElementValue::Usim(_) => Kind::Usim,
            ElementValue::OptUsim(_) => Kind::OptUsim,
            ElementValue::Isim(_) => Kind::Isim,
            ElementValue::OptIsim(_) => Kind::OptIsim,
            ElementValue::Csim(_) => Kind::Csim,
            ElementValue::OptCsim(_) => Kind::OptCsim,
            ElementValue::GsmAccess(_) => Kind::GsmAccess,
            ElementValue::AkaParameter(_) => Kind::AkaParameter,
            ElementValue::CdmaParameter(_) => Kind::CdmaParameter,
            ElementValue::Df5gs(_) => Kind::Df5gs,
            ElementValue::DfSaip(_) => Kind::DfSaip,
            ElementValue::GenericFileManagement(_) => {
                Kind::GenericFileManagement
            }
            ElementValue::SecurityDomain(_) => Kind::SecurityDomain,
            ElementValue::Rfm(_) => Kind::Rfm,
            ElementValue::Application(_) => Kind::Application,
            ElementValue::End(_) => Kind::End,
            ElementValue::Unknown(_) => Kind::Unknown,
        }
    }

    /// Returns the tag number of the element.
    pub fn tag(&self) -> u32 {
        match self {
            ElementValue::Unknown(raw) => raw.tag().number(),
            // All other kinds have a tag.
            other => other.kind().tag().unwrap_or_default(),
        }
    }

    /// Returns the file system if the value is one.
    pub fn as_file_system(&self) -> Option<&FileSystem> {
        use self::ElementValue::*;

        match self {
            MasterFile(fs) | Telecom(fs) | Usim(fs) | OptUsim(fs)
            | Isim(fs) | OptIsim(fs) | Csim(fs) | OptCsim(fs)
            | GsmAccess(fs) | Df5gs(fs) | DfSaip(fs) => Some(fs),
            _ => None
        }
    }

    /// Appends the encoded element to `target`.
    ///
    /// Fails if a mandatory field is missing.
    pub fn append_encoded(
        &self, target: &mut Vec<u8>
    ) -> Result<(), EncodeError> {
        use self::ElementValue::*;

        let tag = Tag::ctx(self.tag());
        let name = self.kind().name();
        infallible(match self {
            Header(v) => v.encode_as(tag)?.write_encoded(target),
            MasterFile(fs) | Telecom(fs) | Usim(fs) | OptUsim(fs)
            | Isim(fs) | OptIsim(fs) | Csim(fs) | OptCsim(fs)
            | GsmAccess(fs) | Df5gs(fs) | DfSaip(fs) => {
                fs.encode_as(tag, name)?.write_encoded(target)
            }
            PinCodes(v) => v.encode_as(tag)?.write_encoded(target),
            PukCodes(v) => v.encode_as(tag)?.write_encoded(target),
            AkaParameter(v) => v.encode_as(tag)?.write_encoded(target),
            CdmaParameter(v) => v.encode_as(tag)?.write_encoded(target),
            GenericFileManagement(v) => {
                v.encode_as(tag)?.write_encoded(target)
            }
            SecurityDomain(v) => v.encode_as(tag)?.write_encoded(target),
            Rfm(v) => v.encode_as(tag)?.write_encoded(target),
            Application(v) => v.encode_as(tag)?.write_encoded(target),
            End(v) => v.encode_as(tag).write_encoded(target),
            Unknown(raw) => raw.write_encoded(target),
        });
        Ok(())
    }
}


//------------ ProfileElement ------------------------------------------------

/// A single element of a profile.
///
/// The element consists of its value and, if it was decoded and hasn’t
/// been changed since, the octets it was decoded from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileElement {
    raw: Option<Captured>,
    value: ElementValue,
}

impl ProfileElement {
    /// Creates a new element from a value.
    ///
    /// The element will be encoded from its value.
    pub fn new(value: ElementValue) -> Self {
        ProfileElement { raw: None, value }
    }

    /// Decodes an element from a record.
    ///
    /// The element keeps all the octets of the record. Records that aren’t
    /// constructed with a context specific tag are kept as unknown
    /// elements.
    pub fn decode(record: &Record) -> Result<Self, DecodeError> {
        let ident = record.ident();
        let value = if
            ident.class() != Class::Context || !ident.is_constructed()
        {
            warn!(
                "profile element at offset {} is {}, keeping it unparsed",
                record.pos(), ident
            );
            ElementValue::Unknown(record.capture())
        }
        else {
            let value = ElementValue::decode(ident.number(), record)?;
            if value.kind() == Kind::Unknown {
                warn!(
                    "unknown profile element tag {} at offset {}",
                    ident.number(), record.pos()
                );
            }
            value
        };
        Ok(ProfileElement { raw: Some(record.capture()), value })
    }

    /// Returns the octets the element was decoded from.
    ///
    /// Returns `None` if the element was created from a value or has been
    /// changed after decoding.
    pub fn raw(&self) -> Option<&Captured> {
        self.raw.as_ref()
    }

    /// Returns the value of the element.
    pub fn value(&self) -> &ElementValue {
        &self.value
    }

    /// Returns a mutable reference to the value.
    ///
    /// This drops the octets the element was decoded from, so that it will
    /// be encoded from the value from now on.
    pub fn value_mut(&mut self) -> &mut ElementValue {
        self.raw = None;
        &mut self.value
    }

    /// Converts the element into its value.
    pub fn into_value(self) -> ElementValue {
        self.value
    }

    /// Returns the tag number of the element.
    pub fn tag(&self) -> u32 {
        self.value.tag()
    }

    /// Returns the kind of the element.
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    /// Appends the encoded element to `target`.
    ///
    /// Writes the octets the element was decoded from if it still has
    /// them. Otherwise encodes the value which fails if a mandatory field
    /// is missing.
    pub fn encode_into(
        &self, target: &mut Vec<u8>
    ) -> Result<(), EncodeError> {
        match self.raw.as_ref() {
            Some(raw) => {
                target.extend_from_slice(raw.as_slice());
                Ok(())
            }
            None => self.value.append_encoded(target)
        }
    }

    /// Returns the encoded element in a new vec.
    pub fn to_vec(&self) -> Result<Vec<u8>, EncodeError> {
        let mut res = Vec::new();
        self.encode_into(&mut res)?;
        Ok(res)
    }
}

impl From<ElementValue> for ProfileElement {
    fn from(value: ElementValue) -> Self {
        Self::new(value)
    }
}


//------------ Profile -------------------------------------------------------

/// A profile.
///
/// The profile is an ordered sequence of elements. The order matters: it
/// is the order in which the card creates files and applications.
///
/// In addition, the profile provides quick access to the first element of
/// some kinds, such as the header or the AKA parameters, and to all
/// security domains and applications.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Profile {
    elements: Vec<ProfileElement>,
    index: Index,
}

impl Profile {
    /// Creates a new, empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a profile using the default limits.
    pub fn decode(data: Bytes) -> Result<Self, DecodeError> {
        Self::decode_with(data, Limits::default())
    }

    /// Decodes a profile from a slice using the default limits.
    ///
    /// The data is copied.
    pub fn from_slice(data: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(Bytes::copy_from_slice(data))
    }

    /// Decodes a profile using the given limits.
    ///
    /// Decoding stops at the first element that fails to decode. The error
    /// carries the offset in `data` where decoding stopped and the index of
    /// the element.
    pub fn decode_with(
        data: Bytes, limits: Limits
    ) -> Result<Self, DecodeError> {
        let mut res = Self::new();
        let mut source = Source::new(data);
        loop {
            let idx = res.elements.len();
            let record = match Record::take_opt_from(&mut source, &limits) {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(err) => return Err(err.at_element(idx)),
            };
            if record.is_truncated() && limits.rejects_truncated() {
                return Err(DecodeError::new(
                    ErrorKind::TruncatedElement, record.pos()
                ).at_element(idx))
            }
            let element = ProfileElement::decode(&record).map_err(|err| {
                err.at_element(idx)
            })?;
            trace!(
                "element {} at offset {}: {} with tag {}, {} octets",
                idx, record.pos(), element.kind(), element.tag(),
                record.full_len()
            );
            res.elements.push(element);
        }
        res.rebuild_index();
        debug!("decoded profile with {} elements", res.elements.len());
        Ok(res)
    }

    /// Encodes the profile into a new vec.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut res = Vec::new();
        self.encode_into(&mut res)?;
        Ok(res)
    }

    /// Appends the encoded profile to `target`.
    ///
    /// If encoding fails, `target` may contain the elements before the
    /// failing one.
    pub fn encode_into(
        &self, target: &mut Vec<u8>
    ) -> Result<(), EncodeError> {
        let start = target.len();
        for element in &self.elements {
            element.encode_into(target)?;
        }
        debug!(
            "encoded profile with {} elements ({} from values) into {} octets",
            self.elements.len(),
            self.elements.iter().filter(|el| el.raw.is_none()).count(),
            target.len() - start
        );
        Ok(())
    }

    /// Returns the elements.
    pub fn elements(&self) -> &[ProfileElement] {
        &self.elements
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> slice::Iter<ProfileElement> {
        self.elements.iter()
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns whether the profile has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends an element.
    pub fn push(&mut self, element: impl Into<ProfileElement>) {
        let element = element.into();
        self.index.add(self.elements.len(), element.kind());
        self.elements.push(element);
    }

    /// Returns a handle for changing the value of an element.
    ///
    /// The element drops the octets it was decoded from. The quick access
    /// references are updated when the handle is dropped.
    pub fn element_mut(&mut self, idx: usize) -> Option<ElementMut> {
        self.elements.get_mut(idx)?.raw = None;
        Some(ElementMut { profile: self, idx })
    }

    /// Converts the profile into its elements.
    pub fn into_elements(self) -> Vec<ProfileElement> {
        self.elements
    }

    fn rebuild_index(&mut self) {
        self.index = Index::default();
        for (idx, element) in self.elements.iter().enumerate() {
            self.index.add(idx, element.kind());
        }
    }

    fn value_at(&self, idx: Option<usize>) -> Option<&ElementValue> {
        self.elements.get(idx?).map(ProfileElement::value)
    }
}

/// # Quick Access
///
impl Profile {
    /// Returns the first profile header.
    pub fn header(&self) -> Option<&ProfileHeader> {
        match self.value_at(self.index.header)? {
            ElementValue::Header(v) => Some(v),
            _ => None
        }
    }

    /// Returns the first master file element.
    pub fn master_file(&self) -> Option<&FileSystem> {
        self.value_at(self.index.master_file)?.as_file_system()
    }

    /// Returns the first PIN codes element.
    pub fn pin_codes(&self) -> Option<&PinCodes> {
        match self.value_at(self.index.pin_codes)? {
            ElementValue::PinCodes(v) => Some(v),
            _ => None
        }
    }

    /// Returns the first PUK codes element.
    pub fn puk_codes(&self) -> Option<&PukCodes> {
        match self.value_at(self.index.puk_codes)? {
            ElementValue::PukCodes(v) => Some(v),
            _ => None
        }
    }

    /// Returns the first USIM application element.
    pub fn usim(&self) -> Option<&FileSystem> {
        self.value_at(self.index.usim)?.as_file_system()
    }

    /// Returns the first ISIM application element.
    pub fn isim(&self) -> Option<&FileSystem> {
        self.value_at(self.index.isim)?.as_file_system()
    }

    /// Returns the first CSIM application element.
    pub fn csim(&self) -> Option<&FileSystem> {
        self.value_at(self.index.csim)?.as_file_system()
    }

    /// Returns the first AKA parameter element.
    pub fn aka_parameter(&self) -> Option<&AkaParameter> {
        match self.value_at(self.index.aka_parameter)? {
            ElementValue::AkaParameter(v) => Some(v),
            _ => None
        }
    }

    /// Returns the first CDMA parameter element.
    pub fn cdma_parameter(&self) -> Option<&CdmaParameter> {
        match self.value_at(self.index.cdma_parameter)? {
            ElementValue::CdmaParameter(v) => Some(v),
            _ => None
        }
    }

    /// Returns an iterator over all security domain elements.
    pub fn security_domains(
        &self
    ) -> impl Iterator<Item = &SecurityDomain> + '_ {
        self.index.security_domains.iter().filter_map(move |idx| {
            match self.value_at(Some(*idx))? {
                ElementValue::SecurityDomain(v) => Some(v),
                _ => None
            }
        })
    }

    /// Returns an iterator over all application elements.
    pub fn applications(&self) -> impl Iterator<Item = &Application> + '_ {
        self.index.applications.iter().filter_map(move |idx| {
            match self.value_at(Some(*idx))? {
                ElementValue::Application(v) => Some(v),
                _ => None
            }
        })
    }

    /// Returns the first end element.
    pub fn end(&self) -> Option<&End> {
        match self.value_at(self.index.end)? {
            ElementValue::End(v) => Some(v),
            _ => None
        }
    }
}


//--- FromIterator, IntoIterator

impl FromIterator<ProfileElement> for Profile {
    fn from_iter<I: IntoIterator<Item = ProfileElement>>(iter: I) -> Self {
        let mut res = Profile {
            elements: iter.into_iter().collect(),
            index: Index::default(),
        };
        res.rebuild_index();
        res
    }
}

impl<'a> IntoIterator for &'a Profile {
    type Item = &'a ProfileElement;
    type IntoIter = slice::Iter<'a, ProfileElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}


//------------ ElementMut ----------------------------------------------------

/// A handle for changing the value of a profile element.
///
/// The handle dereferences to the element’s value. When it is dropped, the
/// quick access references of the profile are rebuilt.
pub struct ElementMut<'a> {
    profile: &'a mut Profile,
    idx: usize,
}

impl<'a> ElementMut<'a> {
    /// Returns the index of the element in the profile.
    pub fn index(&self) -> usize {
        self.idx
    }
}

impl<'a> ops::Deref for ElementMut<'a> {
    type Target = ElementValue;

    fn deref(&self) -> &ElementValue {
        &self.profile.elements[self.idx].value
    }
}

impl<'a> ops::DerefMut for ElementMut<'a> {
    fn deref_mut(&mut self) -> &mut ElementValue {
        &mut self.profile.elements[self.idx].value
    }
}

impl<'a> Drop for ElementMut<'a> {
    fn drop(&mut self) {
        self.profile.rebuild_index()
    }
}


//------------ Index ---------------------------------------------------------

/// The positions of elements for quick access.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Index {
    header: Option<usize>,
    master_file: Option<usize>,
    pin_codes: Option<usize>,
    puk_codes: Option<usize>,
    usim: Option<usize>,
    isim: Option<usize>,
    csim: Option<usize>,
    aka_parameter: Option<usize>,
    cdma_parameter: Option<usize>,
    end: Option<usize>,
    security_domains: Vec<usize>,
    applications: Vec<usize>,
}

impl Index {
    fn add(&mut self, idx: usize, kind: Kind) {
        let slot = match kind {
            Kind::Header => &mut self.header,
            Kind::MasterFile => &mut self.master_file,
            Kind::PinCodes => &mut self.pin_codes,
            Kind::PukCodes => &mut self.puk_codes,
            Kind::Usim => &mut self.usim,
            Kind::Isim => &mut self.isim,
            Kind::Csim => &mut self.csim,
            Kind::AkaParameter => &mut self.aka_parameter,
            Kind::CdmaParameter => &mut self.cdma_parameter,
            Kind::End => &mut self.end,
            Kind::SecurityDomain => {
                self.security_domains.push(idx);
                return
            }
            Kind::Application => {
                self.applications.push(idx);
                return
            }
            _ => return
        };
        if slot.is_none() {
            *slot = Some(idx)
        }
    }
}
