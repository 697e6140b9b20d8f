//! Security domains and remote file management.

use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{EncodeError, PrimitiveContent, Values, iter, sequence};
use crate::ident::{Class, Tag};
use super::app::{AID, ApplicationInstance};
use super::extra::{Extra, Seen};
use super::header::ElementHeader;


//------------ KeyComponent --------------------------------------------------

/// A single component of a key.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyComponent {
    /// `[0]` The key type.
    pub key_type: Option<Bytes>,

    /// `[6]` The key data.
    pub key_data: Option<Bytes>,

    /// `[7]` The length of the MAC.
    pub mac_length: Option<u8>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl KeyComponent {
    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.key_type = Some(item.content().clone())
                }
                (Class::Context, 6) if first => {
                    res.key_data = Some(item.content().clone())
                }
                (Class::Context, 7) if first => {
                    res.mac_length = Some(item.to_u8()?)
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    fn check(&self) -> Result<(), EncodeError> {
        if self.key_type.is_none() {
            return Err(EncodeError::missing(SecurityDomain::NAME, "keyType"))
        }
        if self.key_data.is_none() {
            return Err(EncodeError::missing(SecurityDomain::NAME, "keyData"))
        }
        Ok(())
    }

    fn encode(&self) -> impl Values + '_ {
        sequence((
            self.key_type.as_ref().map(|v| prim(Tag::ctx(0), v)),
            self.key_data.as_ref().map(|v| prim(Tag::ctx(6), v)),
            self.mac_length.map(|v| v.encode_as(Tag::ctx(7))),
            &self.extra,
        ))
    }
}


//------------ KeyObject -----------------------------------------------------

/// A key of a security domain.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyObject {
    /// `[2]` The key identifier.
    pub key_identifier: Option<Bytes>,

    /// `[3]` The key version number.
    pub key_version_number: Option<Bytes>,

    /// `[5]` The initial value of the key counter.
    pub key_counter_value: Option<Bytes>,

    /// `[6]` The components of the key.
    pub key_components: Option<Vec<KeyComponent>>,

    /// `[21]` The key usage qualifier.
    pub key_usage_qualifier: Option<Bytes>,

    /// `[22]` The key access condition.
    pub key_access: Option<Bytes>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl KeyObject {
    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            let content = Some(item.content().clone());
            match (item.tag().class(), item.number()) {
                (Class::Context, 2) if first => res.key_identifier = content,
                (Class::Context, 3) if first => {
                    res.key_version_number = content
                }
                (Class::Context, 5) if first => {
                    res.key_counter_value = content
                }
                (Class::Context, 6) if first => {
                    let mut list = Vec::new();
                    for component in item.records() {
                        list.push(KeyComponent::from_record(&component?)?);
                    }
                    res.key_components = Some(list);
                }
                (Class::Context, 21) if first => {
                    res.key_usage_qualifier = content
                }
                (Class::Context, 22) if first => res.key_access = content,
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    fn check(&self) -> Result<(), EncodeError> {
        let missing = |field| {
            Err(EncodeError::missing(SecurityDomain::NAME, field))
        };
        if self.key_identifier.is_none() {
            return missing("keyIdentifier")
        }
        if self.key_version_number.is_none() {
            return missing("keyVersionNumber")
        }
        if self.key_usage_qualifier.is_none() {
            return missing("keyUsageQualifier")
        }
        match self.key_components.as_ref() {
            Some(list) => list.iter().try_for_each(KeyComponent::check),
            None => missing("keyComponents")
        }
    }

    fn encode(&self) -> impl Values + '_ {
        sequence((
            self.key_identifier.as_ref().map(|v| prim(Tag::ctx(2), v)),
            self.key_version_number.as_ref().map(|v| prim(Tag::ctx(3), v)),
            self.key_counter_value.as_ref().map(|v| prim(Tag::ctx(5), v)),
            self.key_components.as_ref().map(|list| {
                dcons(Tag::ctx(6), iter(list.iter().map(KeyComponent::encode)))
            }),
            self.key_usage_qualifier.as_ref().map(|v| prim(Tag::ctx(21), v)),
            self.key_access.as_ref().map(|v| prim(Tag::ctx(22), v)),
            &self.extra,
        ))
    }
}


//------------ SecurityDomain ------------------------------------------------

/// The security domain element.
///
/// The element creates a security domain instance, loads its keys, and
/// provides personalization data.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SecurityDomain {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The instance of the security domain.
    pub instance: Option<ApplicationInstance>,

    /// `[2]` The keys of the security domain.
    pub key_list: Option<Vec<KeyObject>>,

    /// `[3]` Personalization data as STORE DATA payloads.
    pub sd_perso_data: Option<Vec<Bytes>>,

    /// `[4]` Personalization data for the OPEN.
    pub open_perso_data: Option<Captured>,

    /// `[5]` CAT_TP parameters.
    pub cat_tp_parameters: Option<Captured>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl SecurityDomain {
    const NAME: &'static str = "SecurityDomain";

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
                    res.instance = Some(
                        ApplicationInstance::from_record(&item)?
                    )
                }
                (Class::Context, 2) if first => {
                    let mut list = Vec::new();
                    for key in item.records() {
                        list.push(KeyObject::from_record(&key?)?);
                    }
                    res.key_list = Some(list);
                }
                (Class::Context, 3) if first => {
                    let mut list = Vec::new();
                    for data in item.records() {
                        list.push(data?.content().clone());
                    }
                    res.sd_perso_data = Some(list);
                }
                (Class::Context, 4) if first => {
                    res.open_perso_data = Some(item.capture())
                }
                (Class::Context, 5) if first => {
                    res.cat_tp_parameters = Some(item.capture())
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns the AID of the security domain instance.
    pub fn instance_aid(&self) -> Option<&Bytes> {
        self.instance.as_ref()?.instance_aid.as_ref()
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the instance or a mandatory field of the instance or one of
    /// the keys is missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let instance = self.instance.as_ref().ok_or(
            EncodeError::missing(Self::NAME, "instance")
        )?;
        instance.check(Self::NAME)?;
        for key in self.key_list.iter().flatten() {
            key.check()?;
        }
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            instance.encode_unchecked(Tag::ctx(1)),
            self.key_list.as_ref().map(|list| {
                dcons(Tag::ctx(2), iter(list.iter().map(KeyObject::encode)))
            }),
            self.sd_perso_data.as_ref().map(|list| {
                dcons(Tag::ctx(3), iter(
                    list.iter().map(|v| prim(Tag::OCTET_STRING, v))
                ))
            }),
            &self.open_perso_data,
            &self.cat_tp_parameters,
            &self.extra,
        )))
    }
}


//------------ Rfm -----------------------------------------------------------

/// The remote file management element.
///
/// The element configures an instance of the RFM application.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Rfm {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// The AID of the RFM instance.
    pub instance_aid: Option<Bytes>,

    /// The AID of the security domain the instance is associated with.
    pub security_domain_aid: Option<Bytes>,

    /// `[1]` The toolkit application references.
    pub tar_list: Option<Vec<Bytes>>,

    /// `[2]`
    pub minimum_security_level: Option<Bytes>,

    /// `[3]`
    pub uicc_access_domain: Option<Bytes>,

    /// `[4]`
    pub uicc_admin_access_domain: Option<Bytes>,

    /// `[5]` Access to an ADF.
    pub adf_rfm_access: Option<Captured>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl Rfm {
    const NAME: &'static str = "RFM";

    /// Decodes the element from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut aids = 0;
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            let content = Some(item.content().clone());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => {
                    res.header = ElementHeader::from_record(&item)?
                }
                (Class::Application, 15) if aids < 2 => {
                    if aids == 0 {
                        res.instance_aid = content
                    }
                    else {
                        res.security_domain_aid = content
                    }
                    aids += 1;
                }
                (Class::Context, 1) if first => {
                    let mut list = Vec::new();
                    for tar in item.records() {
                        list.push(tar?.content().clone());
                    }
                    res.tar_list = Some(list);
                }
                (Class::Context, 2) if first => {
                    res.minimum_security_level = content
                }
                (Class::Context, 3) if first => {
                    res.uicc_access_domain = content
                }
                (Class::Context, 4) if first => {
                    res.uicc_admin_access_domain = content
                }
                (Class::Context, 5) if first => {
                    res.adf_rfm_access = Some(item.capture())
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the instance AID or one of the access conditions are
    /// missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let missing = |field| EncodeError::missing(Self::NAME, field);
        let instance_aid = self.instance_aid.as_ref().ok_or_else(|| {
            missing("instanceAID")
        })?;
        let level = self.minimum_security_level.as_ref().ok_or_else(|| {
            missing("minimumSecurityLevel")
        })?;
        let access = self.uicc_access_domain.as_ref().ok_or_else(|| {
            missing("uiccAccessDomain")
        })?;
        let admin = self.uicc_admin_access_domain.as_ref().ok_or_else(|| {
            missing("uiccAdminAccessDomain")
        })?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            prim(AID, instance_aid),
            self.security_domain_aid.as_ref().map(|v| prim(AID, v)),
            self.tar_list.as_ref().map(|list| {
                dcons(Tag::ctx(1), iter(
                    list.iter().map(|v| prim(Tag::OCTET_STRING, v))
                ))
            }),
            prim(Tag::ctx(2), level),
            prim(Tag::ctx(3), access),
            prim(Tag::ctx(4), admin),
            &self.adf_rfm_access,
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

    const SECURITY_DOMAIN: &[u8] = b"\
        \xBF\x37\x4C\
            \xA0\x05\x80\x00\x81\x01\x06\
            \xA1\x1A\
                \x4F\x05\xA0\x00\x00\x01\x51\
                \x4F\x05\xA0\x00\x00\x01\x51\
                \x4F\x02\x01\x02\
                \x82\x01\x80\
                \x83\x01\x0F\
                \xC9\x00\
            \xA2\x1F\
                \x30\x1D\
                    \x82\x01\x01\
                    \x83\x01\x30\
                    \xA6\x12\
                        \x30\x10\
                            \x80\x01\x88\
                            \x86\x08\x01\x02\x03\x04\x05\x06\x07\x08\
                            \x87\x01\x08\
                    \x95\x01\x18\
            \xA3\x06\x04\x04\x80\xE2\x88\x00\
    ";

    #[test]
    fn security_domain() {
        let sd = SecurityDomain::from_record(&record(SECURITY_DOMAIN)).unwrap();
        assert_eq!(
            sd.instance_aid().map(|v| v.as_ref()), Some(&b"\x01\x02"[..])
        );
        let keys = sd.key_list.as_ref().unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].key_access.is_none());
        let components = keys[0].key_components.as_ref().unwrap();
        assert_eq!(components[0].mac_length, Some(8));
        assert_eq!(sd.sd_perso_data.as_ref().map(|v| v.len()), Some(1));
        assert_eq!(
            sd.encode_as(Tag::ctx(55)).unwrap().to_vec(), SECURITY_DOMAIN
        );
    }

    #[test]
    fn security_domain_missing_key_data() {
        let mut sd = SecurityDomain::from_record(
            &record(SECURITY_DOMAIN)
        ).unwrap();
        if let Some(keys) = sd.key_list.as_mut() {
            if let Some(components) = keys[0].key_components.as_mut() {
                components[0].key_data = None;
            }
        }
        assert_eq!(
            sd.encode_as(Tag::ctx(55)).err(),
            Some(EncodeError::missing("SecurityDomain", "keyData"))
        );
    }

    #[test]
    fn rfm() {
        let data = b"\
            \xBF\x38\x1C\
                \xA0\x03\x81\x01\x07\
                \x4F\x03\xA0\x00\x01\
                \xA1\x05\x04\x03\xB0\x00\x00\
                \x82\x01\x12\
                \x83\x01\x00\
                \x84\x01\x00\
                \xA5\x00\
        ";
        let rfm = Rfm::from_record(&record(data)).unwrap();
        assert!(rfm.security_domain_aid.is_none());
        assert_eq!(rfm.tar_list.as_ref().map(|v| v.len()), Some(1));
        assert!(rfm.adf_rfm_access.is_some());
        assert_eq!(rfm.encode_as(Tag::ctx(56)).unwrap().to_vec(), data);

        let rfm = Rfm {
            instance_aid: rfm.instance_aid,
            .. Default::default()
        };
        assert_eq!(
            rfm.encode_as(Tag::ctx(56)).err(),
            Some(EncodeError::missing("RFM", "minimumSecurityLevel"))
        );
    }
}
