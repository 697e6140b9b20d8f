//! Bounds applied while decoding.
//!
//! Profile data may come from places we don’t control. The values of the
//! [`Limits`] type bound the work the decoder is willing to do on such data.


//------------ Limits --------------------------------------------------------

/// The limits applied when decoding.
///
/// The default values are generous enough for any real profile. Use the
/// builder-style methods to change them:
///
/// ```
/// use saip::Limits;
///
/// let limits = Limits::default().with_max_depth(4).reject_truncated(true);
/// assert_eq!(limits.max_depth(), 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    /// The maximum nesting of indefinite length values.
    max_depth: usize,

    /// The maximum number of octets walked looking for end-of-contents.
    max_scan: usize,

    /// Whether top-level records cut short are an error.
    reject_truncated: bool,
}

impl Limits {
    /// The default maximum nesting depth.
    pub const DEFAULT_MAX_DEPTH: usize = 16;

    /// The default maximum length of an indefinite length scan.
    pub const DEFAULT_MAX_SCAN: usize = 16 * 1024 * 1024;

    /// Returns limits with the given maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns limits with the given maximum scan length.
    pub fn with_max_scan(mut self, max_scan: usize) -> Self {
        self.max_scan = max_scan;
        self
    }

    /// Returns limits that do or do not reject truncated elements.
    pub fn reject_truncated(mut self, reject: bool) -> Self {
        self.reject_truncated = reject;
        self
    }

    /// Returns the maximum nesting depth of indefinite length values.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the maximum number of octets an indefinite scan may walk.
    pub fn max_scan(&self) -> usize {
        self.max_scan
    }

    /// Returns whether truncated profile elements are rejected.
    pub fn rejects_truncated(&self) -> bool {
        self.reject_truncated
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_scan: Self::DEFAULT_MAX_SCAN,
            reject_truncated: false,
        }
    }
}
