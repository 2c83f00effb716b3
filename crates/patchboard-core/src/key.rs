#![forbid(unsafe_code)]

//! Dependency keys.
//!
//! A [`Key`] names one unit of observable state, conventionally
//! `Entity.field` (e.g. `"Project.info"`). Keys are opaque to the hub: it
//! only ever hashes and compares them. The single exception is the reserved
//! leading marker [`GLOBAL_MARKER`], which classifies a key as global:
//! matched independently of any subject by both `subscribe` and `notify`.
//!
//! The marker is part of the key's identity: `"X"` and `"*X"` are two
//! distinct keys that may be registered by different observers.

use std::borrow::Cow;
use std::fmt;

/// Reserved leading marker for global keys.
pub const GLOBAL_MARKER: char = '*';

/// An opaque identifier for one unit of observable state.
///
/// Cheap to clone; `&'static str` keys borrow without allocating.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// Create a key from a static string without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a key from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The key's textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key carries the global marker.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.0.starts_with(GLOBAL_MARKER)
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.as_str()).finish()
    }
}
