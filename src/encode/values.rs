//! Everything related to the `Values` trait.
//!
//! This is an internal module. The relevant items are re-exported by the
//! parent.

use std::marker::PhantomData;
use crate::captured::Captured;
use crate::ident::Tag;
use crate::length::Length;
use super::target::{Target, infallible};


//------------ Values --------------------------------------------------------

/// A type that is a value encoder.
///
/// Value encoders know how to encode themselves into a sequence of TLV
/// records. While you can impl this trait for your type manually, in
/// practice it is often easier to define a method called `encode` and let
/// it return some dedicated value encoder type constructed from the types
/// provided by this module.
///
/// A type implementing this trait encodes itself into zero or more records.
/// That is, the type becomes the content or part of the content of a
/// constructed record. All records are produced with definite lengths in
/// their minimal form unless [`IndefiniteConstructed`] is used explicitly.
pub trait Values {
    /// Returns the length of the encoded values.
    fn encoded_len(&self) -> usize;

    /// Encodes the values and writes them to `target`.
    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error>;


    //--- Provided methods

    /// Converts the encoder into one with an explicit tag.
    ///
    /// For an explicit tag, the value is wrapped in a constructed value with
    /// the given tag.
    fn explicit(self, tag: Tag) -> Constructed<Self>
    where Self: Sized {
        Constructed::new(tag, self)
    }

    /// Writes the encoded values into a new vec.
    fn to_vec(&self) -> Vec<u8> {
        let mut target = Vec::with_capacity(self.encoded_len());
        infallible(self.write_encoded(&mut target));
        target
    }

    /// Captures the encoded values.
    ///
    /// The values should encode into exactly one record for the result to
    /// be meaningful.
    fn to_captured(&self) -> Captured {
        Captured::from_values(self)
    }
}


//--- Blanket impls

impl<V: Values + ?Sized> Values for &'_ V {
    fn encoded_len(&self) -> usize {
        (*self).encoded_len()
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        (*self).write_encoded(target)
    }
}


//--- Impls for Tuples

/// Macro for implementing `Values` for tuples.
///
/// This macro implements `Values` for all tuples up to a certain degree.
/// It needs to be invoked as below. All the `Tx`s are the type parameters
/// of the elements the tuple, the numbers are the tuple element numbers.
/// The number need to be provided backwards ending in 0.
///
/// The `tuple` bit of the macro does the actual impl and invokes itself with
/// one less tuple element. The `write` bit below is to implement
/// `write_encoded` backwards (i.e., starting with the smallest number).
macro_rules! tupl_impl {
    // Termination: empty lists, do nothing.
    ( tuple > ) => { };

    // Impl values for the complete lists, then recurse to the lists without
    // their heads.
    ( tuple $t:ident $( $ttail:ident )* > $i:tt $( $itail:tt )* ) => {
        impl<$t: Values, $( $ttail: Values ),*> Values
                for ($t, $( $ttail ),*) {
            fn encoded_len(&self) -> usize {
                self.$i.encoded_len()
                $(
                    + self.$itail.encoded_len()
                )*
            }

            fn write_encoded<T: Target>(
                &self,
                target: &mut T
            ) -> Result<(), T::Error> {
                tupl_impl!( write self, target, $i $( $itail )* );
                Ok(())
            }
        }

        tupl_impl!(
             tuple $($ttail)* > $($itail)*
        );
    };

    // Termination: empty lists, do nothing.
    ( write $self:expr, $target:expr, ) => { };

    // Write all elements of tuple $self to $target in order.
    ( write $self:expr, $target:expr, $i:tt $($itail:tt)*) => {
        tupl_impl!( write $self, $target, $($itail)* );
        $self.$i.write_encoded($target)?
    }
}

// The standard library implements things for tuples up to twelve elements,
// so we do the same.
tupl_impl!(
    tuple T11 T10 T9 T8 T7 T6 T5 T4 T3 T2 T1 T0 > 11 10 9 8 7 6 5 4 3 2 1 0
);


//--- Impl for Option

/// Encoding of an optional value.
///
/// This implementation encodes `None` as nothing, i.e., as an OPTIONAL
/// in ASN.1 parlance.
impl<V: Values> Values for Option<V> {
    fn encoded_len(&self) -> usize {
        match self {
            Some(v) => v.encoded_len(),
            None => 0,
        }
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Some(v) => v.write_encoded(target),
            None => Ok(())
        }
    }
}


//--- Impl for slice and Vec

impl<V: Values> Values for [V] {
    fn encoded_len(&self) -> usize {
        self.iter().map(Values::encoded_len).sum()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.iter().try_for_each(|v| v.write_encoded(target))
    }
}

impl<V: Values> Values for Vec<V> {
    fn encoded_len(&self) -> usize {
        self.as_slice().encoded_len()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.as_slice().write_encoded(target)
    }
}


//------------ Constructed ---------------------------------------------------

/// A value encoder for a single definite length constructed value.
pub struct Constructed<V> {
    /// The tag of the value.
    tag: Tag,

    /// A value encoder for the content of the value.
    inner: V,
}

impl<V> Constructed<V> {
    /// Creates a new constructed value encoder from a tag and content.
    ///
    /// The returned value will encode as a single constructed value with
    /// the given tag and whatever `inner` encodes to as its content.
    pub fn new(tag: Tag, inner: V) -> Self {
        Constructed { tag, inner }
    }
}

impl<V: Values> Values for Constructed<V> {
    fn encoded_len(&self) -> usize {
        total_len(self.tag, self.inner.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        write_header(target, self.tag, true, self.inner.encoded_len())?;
        self.inner.write_encoded(target)
    }
}


//------------ IndefiniteConstructed -----------------------------------------

/// A value encoder for a indefinite length form constructed value.
pub struct IndefiniteConstructed<V> {
    /// The tag of the value.
    tag: Tag,

    /// A value encoder for the content of the value.
    inner: V,
}

impl<V> IndefiniteConstructed<V> {
    /// Creates a new value encoder from a tag and content.
    ///
    /// The returned value will encode as a single indefinite length form
    /// constructed value with the given tag and whatever `inner` encodes
    /// to as its content followed by the end-of-contents marker.
    pub fn new(tag: Tag, inner: V) -> Self {
        Self { tag, inner }
    }
}

impl<V: Values> Values for IndefiniteConstructed<V> {
    fn encoded_len(&self) -> usize {
        total_indefinite_len(self.tag, self.inner.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        write_indefinite_header(target, self.tag)?;
        self.inner.write_encoded(target)?;
        write_end_of_contents(target)
    }
}


//------------ Choice2 -------------------------------------------------------

/// A value encoder for a two-variant enum.
///
/// Instead of implementing `Values` for an enum manually, you can just
/// define a method `encode` that returns a value of this type.
pub enum Choice2<L, R> {
    /// The first choice.
    One(L),

    /// The second choice.
    Two(R)
}

impl<L: Values, R: Values> Values for Choice2<L, R> {
    fn encoded_len(&self) -> usize {
        match self {
            Choice2::One(inner) => inner.encoded_len(),
            Choice2::Two(inner) => inner.encoded_len(),
        }
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Choice2::One(inner) => inner.write_encoded(target),
            Choice2::Two(inner) => inner.write_encoded(target),
        }
    }
}


//------------ Iter ----------------------------------------------------------

/// A wrapper for an iterator of values.
///
/// The type wraps something that impl `IntoIterator`. It needs to be
/// `Clone`, because we need to be able to restart iterating at the beginning.
///
/// The wrapper is needed because a blanket impl on any iterator type is
/// currently not possible.
pub struct Iter<I>(pub I);

impl<I> Iter<I> {
    /// Creates a new iterator encoder atop `iter`.
    pub fn new(iter: I) -> Self {
        Iter(iter)
    }
}

/// Wraps an iterator over value encoders into a value encoder.
pub fn iter<I>(iter: I) -> Iter<I> {
    Iter::new(iter)
}

impl<I> Values for Iter<I>
where
    I: Clone + IntoIterator,
    <I as IntoIterator>::Item: Values
{
    fn encoded_len(&self) -> usize {
        self.0.clone().into_iter().map(|item| item.encoded_len()).sum()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.0.clone().into_iter().try_for_each(|item| {
            item.write_encoded(target)
        })
    }
}


//------------ EncodeSlice ---------------------------------------------------

/// A wrapper for a slice of encodable values.
///
/// A value of this type will take something that can provide a reference to
/// a slice of some value and a closure that converts the values of the slice
/// into something encodable.
//
//  We need the extra type arguments here already or else they are
//  unconstrained in the Values impl.
pub struct EncodeSlice<S, F, U, V>
where
    S: AsRef<[U]>,
    F: Fn(&U) -> V
{
    /// The slice value.
    slice: S,

    /// The converter function.
    op: F,

    /// A markers for extra type arguments.
    marker: PhantomData<(U, V)>,
}

impl<S, F, U, V> EncodeSlice<S, F, U, V>
where
    S: AsRef<[U]>,
    F: Fn(&U) -> V
{
    /// Creates a new wrapper for a given value and closure.
    pub fn new(slice: S, op: F) -> Self {
        Self { slice, op, marker: PhantomData, }
    }
}

/// Creates an encodable wrapper around a slice.
///
/// The function takes a value of a type that can be converted into a slice of
/// some type and a function that converts references to slice elements into
/// some encoder.
pub fn encode_slice<S, F, U, V>(slice: S, op: F) -> EncodeSlice<S, F, U, V>
where
    S: AsRef<[U]>,
    F: Fn(&U) -> V
{
    EncodeSlice::new(slice, op)
}

impl<S, F, U, V> Values for EncodeSlice<S, F, U, V>
where
    S: AsRef<[U]>,
    F: Fn(&U) -> V,
    V: Values
{
    fn encoded_len(&self) -> usize {
        self.slice.as_ref().iter().map(|v| (self.op)(v).encoded_len()).sum()
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        self.slice.as_ref().iter().try_for_each(|v|
            (self.op)(v).write_encoded(target)
        )
    }
}


//------------ Nothing -------------------------------------------------------

/// An encoder for nothing.
///
/// Unsurprisingly, this encodes as zero octets of content. It can be useful
/// for writing an encoder for an enum where some of the variants shouldn’t
/// result in content at all.
pub struct Nothing;

impl Values for Nothing {
    fn encoded_len(&self) -> usize {
        0
    }

    fn write_encoded<T: Target>(
        &self, _target: &mut T
    ) -> Result<(), T::Error> {
        Ok(())
    }
}


//============ Standard Functions ============================================

/// Returns a value encoder for a SEQUENCE containing `inner`.
pub fn sequence<V: Values>(inner: V) -> impl Values {
    Constructed::new(Tag::SEQUENCE, inner)
}

/// Returns a value encoder for a constructed value with the given tag.
///
/// This is identical to `Constructed::new(tag, inner)`. It merely provides a
/// more memorable name.
pub fn sequence_as<V: Values>(tag: Tag, inner: V) -> impl Values {
    Constructed::new(tag, inner)
}

/// Returns the length for a structure based on the tag and content length.
///
/// This is necessary because the length octets have a different length
/// depending on the content length.
pub fn total_len(tag: Tag, content_l: usize) -> usize {
    tag.primitive().encoded_len()
        + Length::definite(content_l).encoded_len()
        + content_l
}

/// Returns the length of a indefinite-form constructed.
///
/// This includes the end-of-contents octets.
pub fn total_indefinite_len(tag: Tag, content_l: usize) -> usize {
    tag.constructed().encoded_len()
        + Length::INDEFINITE.encoded_len()
        + content_l
        + 2 // End-of-contents is two bytes.
}

/// Writes the header for a value.
///
/// The header in the sense of this function is the identifier octets and the
/// length octets.
pub fn write_header<T: Target>(
    target: &mut T,
    tag: Tag,
    constructed: bool,
    content_length: usize,
) -> Result<(), T::Error> {
    target.write_all(&tag.ident(constructed).to_octets())?;
    target.write_all(&Length::definite(content_length).to_octets())
}

/// Writes the header for an indefinite-length constructed.
pub fn write_indefinite_header<T: Target>(
    target: &mut T,
    tag: Tag,
) -> Result<(), T::Error> {
    target.write_all(&tag.constructed().to_octets())?;
    target.write_all(&Length::INDEFINITE.to_octets())
}

/// Writes the end-of-contents octets.
pub fn write_end_of_contents<T: Target>(
    target: &mut T,
) -> Result<(), T::Error> {
    target.write_all(b"\0\0")
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::encode::PrimitiveContent;
    use super::*;

    #[test]
    fn tuples_keep_order() {
        let values = (
            1u8.encode_as(Tag::ctx(0)),
            Some((&b"ab"[..]).encode_as(Tag::ctx(2))),
            None::<Nothing>,
            Nothing,
        );
        assert_eq!(values.encoded_len(), 7);
        assert_eq!(values.to_vec(), b"\x80\x01\x01\x82\x02ab");
    }

    #[test]
    fn constructed() {
        let value = Constructed::new(Tag::ctx(63),
            Constructed::new(Tag::ctx(0), 31u8.encode_as(Tag::ctx(0)))
        );
        assert_eq!(value.to_vec(), b"\xBF\x3F\x05\xA0\x03\x80\x01\x1F");
        assert_eq!(value.encoded_len(), 8);

        let value = IndefiniteConstructed::new(
            Tag::SEQUENCE, 5u8.encode_as(Tag::INTEGER)
        );
        assert_eq!(value.to_vec(), b"\x30\x80\x02\x01\x05\x00\x00");
        assert_eq!(value.encoded_len(), 7);
    }

    #[test]
    fn long_content() {
        let data = vec![0xAAu8; 200];
        let value = sequence(data.as_slice().encode());
        let encoded = value.to_vec();
        assert_eq!(encoded.len(), value.encoded_len());
        assert_eq!(&encoded[..6], b"\x30\x81\xCB\x04\x81\xC8");
    }

    #[test]
    fn slices_and_iters() {
        let items = [1u8, 2, 3];
        let expected = b"\x80\x01\x01\x80\x01\x02\x80\x01\x03";
        assert_eq!(
            encode_slice(&items, |v| v.encode_as(Tag::ctx(0))).to_vec(),
            expected
        );
        assert_eq!(
            iter(items.iter().map(|v| v.encode_as(Tag::ctx(0)))).to_vec(),
            expected
        );
    }
}
