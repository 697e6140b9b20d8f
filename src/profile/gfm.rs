//! Generic file management.

use bytes::Bytes;
use crate::captured::Captured;
use crate::decode::{DecodeError, Record};
use crate::encode::raw::{dcons, prim};
use crate::encode::{
    EncodeError, PrimitiveContent, Target, Values, iter, sequence
};
use crate::ident::{Class, Tag};
use super::extra::{Extra, Seen};
use super::file::FileDescriptor;
use super::header::ElementHeader;


//------------ FileCommand ---------------------------------------------------

/// A single file management command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileCommand {
    /// `[0]` Selects the file or directory given by its path.
    FilePath(Bytes),

    /// `[APPLICATION 2]` Creates a file with the given description.
    CreateFcp(FileDescriptor),

    /// `[1]` Content to write at the current offset.
    FillContent(Bytes),

    /// `[2]` The offset for the following fill content.
    FillOffset(u32),

    /// Any other record, kept in place.
    Other(Captured),
}

impl FileCommand {
    /// Decodes a single command from its record.
    pub fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(match (record.tag().class(), record.number()) {
            (Class::Context, 0) => {
                FileCommand::FilePath(record.content().clone())
            }
            (Class::Application, 2) => {
                FileCommand::CreateFcp(FileDescriptor::from_record(record)?)
            }
            (Class::Context, 1) => {
                FileCommand::FillContent(record.content().clone())
            }
            (Class::Context, 2) => FileCommand::FillOffset(record.to_u32()?),
            _ => FileCommand::Other(record.capture())
        })
    }
}


//--- encode::Values

impl Values for FileCommand {
    fn encoded_len(&self) -> usize {
        match self {
            FileCommand::FilePath(inner) => {
                prim(Tag::ctx(0), inner).encoded_len()
            }
            FileCommand::CreateFcp(inner) => {
                inner.encode_as(Tag::application(2)).encoded_len()
            }
            FileCommand::FillContent(inner) => {
                prim(Tag::ctx(1), inner).encoded_len()
            }
            FileCommand::FillOffset(inner) => {
                inner.encode_as(Tag::ctx(2)).encoded_len()
            }
            FileCommand::Other(inner) => inner.encoded_len(),
        }
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            FileCommand::FilePath(inner) => {
                prim(Tag::ctx(0), inner).write_encoded(target)
            }
            FileCommand::CreateFcp(inner) => {
                inner.encode_as(Tag::application(2)).write_encoded(target)
            }
            FileCommand::FillContent(inner) => {
                prim(Tag::ctx(1), inner).write_encoded(target)
            }
            FileCommand::FillOffset(inner) => {
                inner.encode_as(Tag::ctx(2)).write_encoded(target)
            }
            FileCommand::Other(inner) => inner.write_encoded(target),
        }
    }
}


//------------ GenericFileManagement -----------------------------------------

/// The generic file management element.
///
/// The element carries a list of command sequences. Each sequence is run in
/// order and the order of commands within a sequence is kept when
/// re-encoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GenericFileManagement {
    /// `[0]` The element header.
    pub header: ElementHeader,

    /// `[1]` The command sequences.
    pub commands: Option<Vec<Vec<FileCommand>>>,

    /// Inner records without a field of their own.
    pub extra: Extra,
}

impl GenericFileManagement {
    const NAME: &'static str = "GenericFileManagement";

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
                    let mut list = Vec::new();
                    for seq in item.records() {
                        let mut commands = Vec::new();
                        for command in seq?.records() {
                            commands.push(FileCommand::from_record(&command?)?);
                        }
                        list.push(commands);
                    }
                    res.commands = Some(list);
                }
                _ => res.extra.push(item.capture())
            }
        }
        Ok(res)
    }

    /// Iterates over all commands of all sequences in order.
    pub fn iter_commands(&self) -> impl Iterator<Item = &FileCommand> + '_ {
        self.commands.iter().flatten().flatten()
    }

    /// Returns a value encoder for the element using the given tag.
    ///
    /// Fails if the command list is missing.
    pub fn encode_as(
        &self, tag: Tag
    ) -> Result<impl Values + '_, EncodeError> {
        let commands = self.commands.as_ref().ok_or(
            EncodeError::missing(Self::NAME, "fileManagementCMD")
        )?;
        Ok(dcons(tag, (
            self.header.encode_as(Tag::ctx(0)),
            dcons(Tag::ctx(1), iter(commands.iter().map(sequence))),
            &self.extra,
        )))
    }
}


//============ Tests =========================================================
