//! Error Handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use thiserror::Error;


//------------ EncodeError ---------------------------------------------------

/// An error happened while encoding a profile element.
///
/// Encoding from captured octets cannot fail. Encoding from a structured
/// value fails only if a field without a default is missing.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum EncodeError {
    /// A mandatory field of a structured value is absent.
    #[error("{element}: missing mandatory field {field}")]
    MissingField {
        /// The name of the element variant.
        element: &'static str,

        /// The name of the missing field.
        field: &'static str,
    },
}

impl EncodeError {
    /// Creates a missing field error.
    pub fn missing(element: &'static str, field: &'static str) -> Self {
        EncodeError::MissingField { element, field }
    }
}
