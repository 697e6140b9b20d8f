//! Inner records without a field of their own.

use std::slice;
use smallvec::SmallVec;
use crate::captured::Captured;
use crate::encode::{Target, Values};
use crate::ident::Tag;


//------------ Extra ---------------------------------------------------------

/// Inner records of a structured payload that have no field of their own.
///
/// Records end up here if the decoder doesn’t know their tag. They are kept
/// verbatim and are encoded after all known fields. The records are kept
/// ordered by tag, i.e., by class first and then by number, with records
/// of the same tag in the order they were added.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Extra(Vec<Captured>);

impl Extra {
    /// Creates a new, empty value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    pub fn push(&mut self, record: Captured) {
        let tag = record.tag();
        let idx = self.0.partition_point(|item| item.tag() <= tag);
        self.0.insert(idx, record);
    }

    /// Returns an iterator over all records with the given tag.
    pub fn get(&self, tag: Tag) -> impl Iterator<Item = &Captured> + '_ {
        self.0.iter().filter(move |item| item.tag() == tag)
    }

    /// Returns an iterator over all records.
    pub fn iter(&self) -> slice::Iter<Captured> {
        self.0.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Extra {
    type Item = &'a Captured;
    type IntoIter = slice::Iter<'a, Captured>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


//--- encode::Values

impl Values for Extra {
    fn encoded_len(&self) -> usize {
        self.0.encoded_len()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.0.write_encoded(target)
    }
}


//------------ Seen ----------------------------------------------------------

/// The tags of the inner records a decoder has come across so far.
///
/// A field only takes the first record with its tag. Later records with
/// the same tag go into the extra records instead.
#[derive(Clone, Debug, Default)]
pub(crate) struct Seen(SmallVec<[Tag; 16]>);

impl Seen {
    /// Creates a new value with no tags seen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `tag` and returns whether it hasn’t been seen before.
    pub fn first(&mut self, tag: Tag) -> bool {
        if self.0.contains(&tag) {
            false
        }
        else {
            self.0.push(tag);
            true
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordered_by_tag() {
        let mut extra = Extra::new();
        extra.push(Captured::new(Tag::private(1).primitive(), b"a"));
        extra.push(Captured::new(Tag::ctx(9).primitive(), b"b"));
        extra.push(Captured::new(Tag::ctx(7).primitive(), b"c"));
        extra.push(Captured::new(Tag::ctx(9).primitive(), b"d"));
        extra.push(Captured::new(Tag::application(30).primitive(), b"e"));

        assert_eq!(
            extra.to_vec(),
            b"\x5E\x01e\x87\x01c\x89\x01b\x89\x01d\xC1\x01a"
        );
        assert_eq!(extra.get(Tag::ctx(9)).count(), 2);
        assert_eq!(extra.len(), 5);
    }

    #[test]
    fn seen_once() {
        let mut seen = Seen::new();
        assert!(seen.first(Tag::ctx(1)));
        assert!(seen.first(Tag::private(1)));
        assert!(!seen.first(Tag::ctx(1)));
        assert!(!seen.first(Tag::private(1)));
    }
}
