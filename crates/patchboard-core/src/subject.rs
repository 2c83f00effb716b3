#![forbid(unsafe_code)]

//! Subject identity.
//!
//! Registries key scoped entries by subject *identity*, never by value.
//! Rust has no reference-identity-keyed map over arbitrary values, so each
//! subject is assigned an opaque stable [`SubjectId`] at creation and the
//! registries key on that. Domain objects embed a [`SubjectTag`] (which
//! allocates the id) and implement [`Subject`] by returning it.
//!
//! The registry holds no reference to the subject itself; when a subject is
//! destroyed its owner calls [`Hub::retire_subject`](crate::Hub::retire_subject)
//! to purge any remaining scoped buckets.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque stable identifier for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId(u64);

impl SubjectId {
    /// Allocate a fresh, never-before-seen id.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_SUBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value, for logging and diagnostics.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Embeddable identity tag. Construction allocates a fresh [`SubjectId`];
/// the tag never changes for the lifetime of the owning object.
#[derive(Debug)]
pub struct SubjectTag {
    id: SubjectId,
}

impl SubjectTag {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SubjectId::fresh(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SubjectId {
        self.id
    }
}

impl Default for SubjectTag {
    fn default() -> Self {
        Self::new()
    }
}

/// Implemented by domain objects that own observable state.
pub trait Subject {
    /// The object's stable identity.
    fn subject_id(&self) -> SubjectId;
}
