//! File descriptors, elementary files and file system elements.

use std::collections::BTreeMap;
use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{EncodeError, PrimitiveContent, Target, Values, iter};
use crate::ident::{Class, Tag};
use crate::oid::Oid;
use super::extra::{Extra, Seen};
use super::header::ElementHeader;


//------------ FileDescriptor ------------------------------------------------

/// The description of a file to be created.
///
/// This appears as the `[1]` item of an elementary file and as the
/// `[APPLICATION 2]` create-FCP command in generic file management. All
/// fields are kept as octets since their interpretation depends on the
/// file type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileDescriptor {
    /// `[0]` The size of an elementary file.
    pub ef_file_size: Option<Bytes>,

    /// `[2]` The file descriptor byte and record information.
    pub file_descriptor: Option<Bytes>,

    /// `[3]` The file identifier.
    pub file_id: Option<Bytes>,

    /// `[4]` The DF name of an application directory.
    pub df_name: Option<Bytes>,

    /// `[5]` Proprietary information.
    pub proprietary_ef_info: Option<Captured>,

    /// `[6]` The PIN status template.
    pub pin_status_template: Option<Bytes>,

    /// `[8]` The short file identifier.
    pub short_ef_id: Option<Bytes>,

    /// `[10]` The life cycle status.
    pub lcsi: Option<Bytes>,

    /// `[11]` The referenced security attributes.
    pub security_attributes_referenced: Option<Bytes>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl FileDescriptor {
    /// Decodes the descriptor from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut res = Self::default();
        let mut seen = Seen::new();
        for item in record.records() {
            let item = item?;
            let first = seen.first(item.tag());
            let content = Some(item.content().clone());
            match (item.tag().class(), item.number()) {
                (Class::Context, 0) if first => res.ef_file_size = content,
                (Class::Context, 2) if first => res.file_descriptor = content,
                (Class::Context, 3) if first => res.file_id = content,
                (Class::Context, 4) if first => res.df_name = content,
                (Class::Context, 5) if first => {
                    res.proprietary_ef_info = Some(item.capture())
                }
                (Class::Context, 6) if first => {
                    res.pin_status_template = content
                }
                (Class::Context, 8) if first => res.short_ef_id = content,
                (Class::Context, 10) if first => res.lcsi = content,
                (Class::Context, 11) if first => {
                    res.security_attributes_referenced = content
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the descriptor using the given tag.
    pub fn encode_as(&self, tag: Tag) -> impl Values + '_ {
        fn opt(tag: u32, value: &Option<Bytes>) -> Option<impl Values + '_> {
            value.as_ref().map(|v| prim(Tag::ctx(tag), v))
        }

        dcons(tag, (
            opt(0, &self.ef_file_size),
            opt(2, &self.file_descriptor),
            opt(3, &self.file_id),
            opt(4, &self.df_name),
            &self.proprietary_ef_info,
            opt(6, &self.pin_status_template),
            opt(8, &self.short_ef_id),
            opt(10, &self.lcsi),
            opt(11, &self.security_attributes_referenced),
            &self.extra,
        ))
    }
}


//------------ FileItem ------------------------------------------------------

/// One item of the content of an elementary file.
///
/// The order of items is significant: a fill offset positions the fill
/// content that follows it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileItem {
    /// `[0]` The file already exists and must not be created.
    DoNotCreate,

    /// `[1]` The description of the file.
    Descriptor(FileDescriptor),

    /// `[2]` The offset for the following fill content.
    FillOffset(u32),

    /// `[3]` Content to write at the current offset.
    FillContent(Bytes),

    /// Any other record, kept in place.
    Other(Captured),
}

impl FileItem {
    /// Decodes a single item from its record.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(match (record.tag().class(), record.number()) {
            (Class::Context, 0) => FileItem::DoNotCreate,
            (Class::Context, 1) => {
                FileItem::Descriptor(FileDescriptor::from_record(record)?)
            }
            (Class::Context, 2) => FileItem::FillOffset(record.to_u32()?),
            (Class::Context, 3) => {
                FileItem::FillContent(record.content().clone())
            }
            _ => FileItem::Other(record.capture())
        })
    }
}


//--- encode::Values

impl Values for FileItem {
    fn encoded_len(&self) -> usize {
        match self {
            FileItem::DoNotCreate => ().encode_as(Tag::ctx(0)).encoded_len(),
            FileItem::Descriptor(inner) => {
                inner.encode_as(Tag::ctx(1)).encoded_len()
            }
            FileItem::FillOffset(inner) => {
                inner.encode_as(Tag::ctx(2)).encoded_len()
            }
            FileItem::FillContent(inner) => {
                prim(Tag::ctx(3), inner).encoded_len()
            }
            FileItem::Other(inner) => inner.encoded_len(),
        }
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            FileItem::DoNotCreate => {
                ().encode_as(Tag::ctx(0)).write_encoded(target)
            }
            FileItem::Descriptor(inner) => {
                inner.encode_as(Tag::ctx(1)).write_encoded(target)
            }
            FileItem::FillOffset(inner) => {
                inner.encode_as(Tag::ctx(2)).write_encoded(target)
            }
            FileItem::FillContent(inner) => {
                prim(Tag::ctx(3), inner).write_encoded(target)
            }
            FileItem::Other(inner) => inner.write_encoded(target),
        }
    }
}


//------------ ElementaryFile ------------------------------------------------

/// The content of an elementary or dedicated file.
///
/// This is an ordered sequence of items that is re-encoded in the order it
/// was decoded.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ElementaryFile {
    /// The items in encoding order.
    pub items: Vec<FileItem>,
}

impl ElementaryFile {
    /// Decodes the file from the content of `record`.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut items = Vec::new();
        for item in record.records() {
            items.push(FileItem::from_record(&item?)?);
        }
        Ok(ElementaryFile { items })
    }

    /// Returns the file descriptor if there is one.
    pub fn descriptor(&self) -> Option<&FileDescriptor> {
        self.items.iter().find_map(|item| match item {
            FileItem::Descriptor(inner) => Some(inner),
            _ => None,
        })
    }

    /// Returns the fill content paired with the offset that positions it.
    ///
    /// Content before any offset item is positioned at offset zero. An
    /// offset item applies until the next offset item.
    pub fn fill(&self) -> impl Iterator<Item = (u32, &Bytes)> + '_ {
        self.items.iter().scan(0, |offset, item| {
            match item {
                FileItem::FillOffset(value) => {
                    *offset = *value;
                    Some(None)
                }
                FileItem::FillContent(content) => {
                    Some(Some((*offset, content)))
                }
                _ => Some(None)
            }
        }).flatten()
    }

    /// Returns a value encoder for the file using the given tag.
    pub fn encode_as(&self, tag: Tag) -> impl Values + '_ {
        dcons(tag, &self.items)
    }
}


//------------ FileSystem ----------------------------------------------------

/// A file system element.
///
/// This is used for the master file, the telecom directory, and all the
/// application and directory elements. They all consist of a header, the
/// identifier of the template the files are derived from, and the files
/// keyed by their tag number which is two or larger.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileSystem {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The template the file system is created from.
    pub template_id: Option<Oid>,

    /// `[2..]` The files keyed by tag number.
    pub files: BTreeMap<u32, ElementaryFile>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl FileSystem {
    /// The lowest tag number of a file.
    pub const FIRST_FILE: u32 = 2;

    /// Creates a new file system from header and template.
    pub fn new(header: ElementHeader, template_id: Oid) -> Self {
        FileSystem {
            header,
            template_id: Some(template_id),
            files: BTreeMap::new(),
            extra: Extra::new(),
        }
    }

    /// Decodes the file system from the content of `record`.
    ///
    /// Files appearing more than once are kept in the extra records.
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
                    res.template_id = Some(Oid::from_record(&item)?)
                }
                (Class::Context, number)
                    if item.is_constructed()
                        && !res.files.contains_key(&number) =>
                {
                    res.files.insert(
                        number, ElementaryFile::from_record(&item)?
                    );
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Returns a value encoder for the file system using the given tag.
    ///
    /// Fails if the template is missing. Files with a tag number below
    /// two are skipped as they would collide with header and template.
    pub fn encode_as(
        &self, tag: Tag, element: &'static str
    ) -> Result<impl Values + '_, EncodeError> {
        let template = self.template_id.as_ref().ok_or(
            EncodeError::missing(element, "templateID")
        )?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            template.encode_as(Tag::ctx(1)),
            iter(
                self.files.range(Self::FIRST_FILE..).map(|(number, file)| {
                    file.encode_as(Tag::ctx(*number))
                })
            ),
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

    #[test]
    fn elementary_file_keeps_item_order() {
        let data = b"\
            \xA4\x1D\
                \xA1\x0A\x82\x02\x42\x21\x83\x02\x6F\x07\x87\x00\
                \x82\x01\x00\x83\x02ab\
                \x82\x01\x10\x83\x02cd\x83\x01e\
        ";
        let file = ElementaryFile::from_record(&record(data)).unwrap();
        assert_eq!(file.items.len(), 6);
        let descriptor = file.descriptor().unwrap();
        assert_eq!(descriptor.file_id.as_deref(), Some(&b"\x6F\x07"[..]));
        assert_eq!(descriptor.extra.len(), 1);
        let fill: Vec<_> = file.fill().map(|(offset, content)| {
            (offset, content.as_ref())
        }).collect();
        assert_eq!(
            fill,
            [(0, &b"ab"[..]), (0x10, &b"cd"[..]), (0x10, &b"e"[..])]
        );
        assert_eq!(file.encode_as(Tag::ctx(4)).to_vec(), &data[..]);
    }

    #[test]
    fn file_system() {
        let data = b"\
            \xA1\x1A\
                \xA0\x05\x80\x00\x81\x01\x01\
                \x81\x06\x67\x81\x0F\x01\x02\x01\
                \xA2\x02\x80\x00\
                \xA5\x05\xA1\x03\x83\x01\x3F\
        ";
        let fs = FileSystem::from_record(&record(data)).unwrap();
        assert!(fs.header.mandated);
        assert_eq!(fs.template_id.as_ref().unwrap().to_string(),
            "2.23.143.1.2.1"
        );
        assert_eq!(fs.files.keys().copied().collect::<Vec<_>>(), [2, 5]);
        assert_eq!(
            fs.encode_as(Tag::ctx(1), "MasterFile").unwrap().to_vec(),
            &data[..]
        );
    }

    #[test]
    fn files_emitted_ascending() {
        let mut fs = FileSystem::new(
            ElementHeader::new(false, 2),
            Oid::from_components(&[2, 23, 143, 1, 2, 4]).unwrap(),
        );
        fs.files.insert(9, ElementaryFile {
            items: vec![FileItem::FillContent(Bytes::from_static(b"x"))]
        });
        fs.files.insert(3, ElementaryFile {
            items: vec![FileItem::DoNotCreate]
        });
        let encoded = fs.encode_as(Tag::ctx(4), "Telecom").unwrap().to_vec();
        assert_eq!(
            encoded,
            b"\xA4\x16\
              \xA0\x03\x81\x01\x02\
              \x81\x06\x67\x81\x0F\x01\x02\x04\
              \xA3\x02\x80\x00\
              \xA9\x03\x83\x01x"
        );
    }

    #[test]
    fn file_system_without_template() {
        assert_eq!(
            FileSystem::default().encode_as(Tag::ctx(4), "Telecom").err(),
            Some(EncodeError::missing("Telecom", "templateID"))
        );
    }
}
