//! Normalized-key comparison used uniformly for format, MIME and text matching.

use std::fmt;

/// A case-folded comparison key.
///
/// Two keys are equal when their source strings are equal ignoring case.
/// Keys preserve nothing of the original spelling, so callers keep the
/// original string alongside when it has to be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(s.to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NormalizedKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case-insensitive equality of two strings.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    // Fast path for the common ASCII case avoids two allocations
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    NormalizedKey::new(a) == NormalizedKey::new(b)
}

/// Case-insensitive equality of two (format, mimetype) pairs.
#[must_use]
pub fn pair_eq_ignore_case(a: (&str, &str), b: (&str, &str)) -> bool {
    eq_ignore_case(a.0, b.0) && eq_ignore_case(a.1, b.1)
}

/// Check whether `needle` appears in `haystack`, ignoring case.
#[must_use]
pub fn contains_ignore_case<S: AsRef<str>>(haystack: &[S], needle: &str) -> bool {
    haystack.iter().any(|s| eq_ignore_case(s.as_ref(), needle))
}
