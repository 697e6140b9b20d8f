//! Application elements.

use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{EncodeError, Values, iter};
use crate::ident::{Class, Tag};
use super::extra::{Extra, Seen};
use super::header::ElementHeader;


/// The tag of application identifiers.
pub(crate) const AID: Tag = Tag::application(15);


//------------ ApplicationInstance -------------------------------------------

/// An instance of an application.
///
/// The four AIDs all share the same tag and are identified by their
/// position only.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplicationInstance {
    /// The AID of the load package the application is created from.
    pub load_package_aid: Option<Bytes>,

    /// The AID of the class within the load package.
    pub class_aid: Option<Bytes>,

    /// The AID of the new instance.
    pub instance_aid: Option<Bytes>,

    /// The AID of the security domain to extradite the instance to.
    pub extradite_security_domain_aid: Option<Bytes>,

    /// `[2]` The application privileges.
    pub privileges: Option<Bytes>,

    /// `[3]` The life cycle state.
    pub life_cycle_state: Option<Bytes>,

    /// `[PRIVATE 9]` The install parameters for the application.
    pub specific_parameters_c9: Option<Bytes>,

    /// `[PRIVATE 10]` Application parameters.
    pub application_parameters: Option<Captured>,

    /// `[PRIVATE 15]` System specific parameters.
    pub system_specific_parameters: Option<Captured>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl ApplicationInstance {
    /// Decodes the instance from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut aids = 0;
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            match (item.tag().class(), item.number()) {
                (Class::Application, 15) if aids < 4 => {
                    let aid = Some(item.content().clone());
                    match aids {
                        0 => res.load_package_aid = aid,
                        1 => res.class_aid = aid,
                        2 => res.instance_aid = aid,
                        _ => res.extradite_security_domain_aid = aid,
                    }
                    aids += 1;
                }
                (Class::Context, 2) if first => {
                    res.privileges = Some(item.content().clone())
                }
                (Class::Context, 3) if first => {
                    res.life_cycle_state = Some(item.content().clone())
                }
                (Class::Private, 9) if first => {
                    res.specific_parameters_c9 = Some(item.content().clone())
                }
                (Class::Private, 10) if first => {
                    res.application_parameters = Some(item.capture())
                }
                (Class::Private, 15) if first => {
                    res.system_specific_parameters = Some(item.capture())
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Checks that all mandatory fields are present.
    ///
    /// Errors name `element` as the element the instance is part of.
    pub fn check(&self, element: &'static str) -> Result<(), EncodeError> {
        let missing = |field| Err(EncodeError::missing(element, field));
        if self.load_package_aid.is_none() {
            return missing("applicationLoadPackageAID")
        }
        if self.class_aid.is_none() {
            return missing("classAID")
        }
        if self.instance_aid.is_none() {
            return missing("instanceAID")
        }
        if self.privileges.is_none() {
            return missing("applicationPrivileges")
        }
        if self.life_cycle_state.is_none() {
            return missing("lifeCycleState")
        }
        if self.specific_parameters_c9.is_none() {
            return missing("applicationSpecificParametersC9")
        }
        Ok(())
    }

    /// Returns a value encoder for the instance using the given tag.
    ///
    /// Fails if a mandatory field is missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        self.check("ApplicationInstance")?;
        Ok(self.encode_unchecked(tag))
    }

    /// Returns a value encoder without checking the mandatory fields.
    pub(crate) fn encode_unchecked(&self, tag: Tag) -> impl Values + '_ {
        dcons(tag, (
            self.load_package_aid.as_ref().map(|v| prim(AID, v)),
            self.class_aid.as_ref().map(|v| prim(AID, v)),
            self.instance_aid.as_ref().map(|v| prim(AID, v)),
            self.extradite_security_domain_aid.as_ref().map(|v| prim(AID, v)),
            self.privileges.as_ref().map(|v| prim(Tag::ctx(2), v)),
            self.life_cycle_state.as_ref().map(|v| prim(Tag::ctx(3), v)),
            self.specific_parameters_c9.as_ref().map(|v| {
                prim(Tag::private(9), v)
            }),
            &self.application_parameters,
            &self.system_specific_parameters,
            &self.extra,
        ))
    }
}


//------------ LoadBlock -----------------------------------------------------

/// The load file of an application.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LoadBlock {
    /// The AID of the load package.
    pub load_package_aid: Option<Bytes>,

    /// The AID of the security domain the package is associated with.
    pub security_domain_aid: Option<Bytes>,

    /// `[PRIVATE 1]` The hash of the load file.
    pub hash_value: Option<Bytes>,

    /// `[PRIVATE 4]` The load file itself.
    pub load_block_object: Option<Bytes>,

    /// `[PRIVATE 6]`
    pub non_volatile_code_limit: Option<Bytes>,

    /// `[PRIVATE 7]`
    pub volatile_data_limit: Option<Bytes>,

    /// `[PRIVATE 8]`
    pub non_volatile_data_limit: Option<Bytes>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl LoadBlock {
    /// Decodes the load block from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut aids = 0;
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            let content = Some(item.content().clone());
            match (item.tag().class(), item.number()) {
                (Class::Application, 15) if aids < 2 => {
                    if aids == 0 {
                        res.load_package_aid = content
                    }
                    else {
                        res.security_domain_aid = content
                    }
                    aids += 1;
                }
                (Class::Private, 1) if first => res.hash_value = content,
                (Class::Private, 4) if first => {
                    res.load_block_object = content
                }
                (Class::Private, 6) if first => {
                    res.non_volatile_code_limit = content
                }
                (Class::Private, 7) if first => {
                    res.volatile_data_limit = content
                }
                (Class::Private, 8) if first => {
                    res.non_volatile_data_limit = content
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    fn check(&self) -> Result<(), EncodeError> {
        if self.load_package_aid.is_none() {
            return Err(EncodeError::missing(
                Application::NAME, "loadPackageAID"
            ))
        }
        if self.load_block_object.is_none() {
            return Err(EncodeError::missing(
                Application::NAME, "loadBlockObject"
            ))
        }
        Ok(())
    }

    fn encode_as(&self, tag: Tag) -> impl Values + '_ {
        fn opt(number: u32, value: &Option<Bytes>) -> Option<impl Values + '_> {
            value.as_ref().map(|v| prim(Tag::private(number), v))
        }

        dcons(tag, (
            self.load_package_aid.as_ref().map(|v| prim(AID, v)),
            self.security_domain_aid.as_ref().map(|v| prim(AID, v)),
            opt(1, &self.hash_value),
            opt(4, &self.load_block_object),
            opt(6, &self.non_volatile_code_limit),
            opt(7, &self.volatile_data_limit),
            opt(8, &self.non_volatile_data_limit),
            &self.extra,
        ))
    }
}


//------------ Application ---------------------------------------------------

/// The application element.
///
/// An application element loads a package onto the card and creates
/// instances of its applications.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Application {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The package to load.
    pub load_block: Option<LoadBlock>,

    /// `[2]` The instances to create.
    pub instances: Option<Vec<ApplicationInstance>>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl Application {
    const NAME: &'static str = "Application";

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
                    res.load_block = Some(LoadBlock::from_record(&item)?)
                }
                (Class::Context, 2) if first => {
                    let mut list = Vec::new();
                    for instance in item.records() {
                        list.push(
                            ApplicationInstance::from_record(&instance?)?
                        );
                    }
                    res.instances = Some(list);
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if a mandatory field of the load block or of an instance is
    /// missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        if let Some(load_block) = self.load_block.as_ref() {
            load_block.check()?;
        }
        for instance in self.instances.iter().flatten() {
            instance.check(Self::NAME)?;
        }
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            self.load_block.as_ref().map(|v| v.encode_as(Tag::ctx(1))),
            self.instances.as_ref().map(|list| {
                dcons(Tag::ctx(2), iter(list.iter().map(|instance| {
                    instance.encode_unchecked(Tag::SEQUENCE)
                })))
            }),
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

    const APPLICATION: &[u8] = b"\
        \xBF\x39\x43\
            \xA0\x05\x80\x00\x81\x01\x0A\
            \xA1\x0D\
                \x4F\x05\xA0\x00\x00\x00\x01\
                \xC4\x04\x01\x02\x03\x04\
            \xA2\x2B\
                \x30\x29\
                    \x4F\x05\xA0\x00\x00\x00\x01\
                    \x4F\x06\xA0\x00\x00\x00\x01\x01\
                    \x4F\x07\xA0\x00\x00\x00\x01\x01\x01\
                    \x82\x03\x00\x00\x00\
                    \x83\x01\x07\
                    \xC9\x03\x81\x01\x00\
                    \xEA\x02\x80\x00\
    ";

    #[test]
    fn application() {
        let app = Application::from_record(&record(APPLICATION)).unwrap();
        assert_eq!(app.header.identification, Some(10));
        let load_block = app.load_block.as_ref().unwrap();
        assert!(load_block.security_domain_aid.is_none());
        assert_eq!(
            load_block.load_block_object.as_deref(),
            Some(&b"\x01\x02\x03\x04"[..])
        );

        let instances = app.instances.as_ref().unwrap();
        assert_eq!(instances.len(), 1);
        let instance = &instances[0];
        assert_eq!(
            instance.instance_aid.as_deref(),
            Some(&b"\xA0\x00\x00\x00\x01\x01\x01"[..])
        );
        assert!(instance.extradite_security_domain_aid.is_none());
        assert!(instance.application_parameters.is_some());
        assert!(instance.extra.is_empty());

        assert_eq!(
            app.encode_as(Tag::ctx(57)).unwrap().to_vec(), APPLICATION
        );
    }

    #[test]
    fn positional_aids() {
        let instance = ApplicationInstance::from_record(&record(b"\
            \x30\x12\
                \x4F\x01\x01\x4F\x01\x02\x4F\x01\x03\x4F\x01\x04\
                \x4F\x01\x05\
                \x83\x01\x07\
        ")).unwrap();
        assert_eq!(instance.class_aid.as_deref(), Some(&b"\x02"[..]));
        assert_eq!(
            instance.extradite_security_domain_aid.as_deref(),
            Some(&b"\x04"[..])
        );
        assert_eq!(instance.extra.len(), 1);
        assert_eq!(
            instance.encode_as(Tag::SEQUENCE).err(),
            Some(EncodeError::missing(
                "ApplicationInstance", "applicationPrivileges"
            ))
        );
    }

    #[test]
    fn instance_missing_c9() {
        let mut app = Application::from_record(
            &record(APPLICATION)
        ).unwrap();
        if let Some(list) = app.instances.as_mut() {
            list[0].specific_parameters_c9 = None;
        }
        assert_eq!(
            app.encode_as(Tag::ctx(57)).err(),
            Some(EncodeError::missing(
                "Application", "applicationSpecificParametersC9"
            ))
        );
    }
}
