#![forbid(unsafe_code)]

//! Exact storage for scoped and global subscriptions.
//!
//! Two leaf structures with no fan-out logic of their own:
//!
//! - [`ScopedRegistry`]: `SubjectId → Key → bucket`, for subscriptions that
//!   are meaningful only relative to one subject.
//! - [`GlobalRegistry`]: `Key → bucket`, for subject-independent
//!   subscriptions on global-marked keys.
//!
//! Buckets are small vectors with set semantics over observer identity.
//!
//! # Invariants
//!
//! 1. `add` of an already-present (…, observer) is a no-op.
//! 2. `remove` prunes an emptied bucket, and an emptied subject entry;
//!    neither registry ever retains a permanently empty branch.
//! 3. `snapshot` returns a copy; the caller may invoke callbacks that
//!    mutate the live bucket without disturbing its iteration.

use ahash::AHashMap;

use crate::key::Key;
use crate::observer::Observer;
use crate::subject::SubjectId;

fn bucket_add(bucket: &mut Vec<Observer>, observer: &Observer) {
    if !bucket.iter().any(|o| o.ptr_eq(observer)) {
        bucket.push(observer.clone());
    }
}

fn bucket_remove(bucket: &mut Vec<Observer>, observer: &Observer) {
    if let Some(i) = bucket.iter().position(|o| o.ptr_eq(observer)) {
        bucket.remove(i);
    }
}

/// Two-level store for scoped subscriptions.
#[derive(Default)]
pub struct ScopedRegistry {
    subjects: AHashMap<SubjectId, AHashMap<Key, Vec<Observer>>>,
}

impl ScopedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(subject, key, observer)`, creating intermediate maps as
    /// needed. Re-adding an existing member is a no-op.
    pub fn add(&mut self, subject: SubjectId, key: Key, observer: &Observer) {
        let bucket = self
            .subjects
            .entry(subject)
            .or_default()
            .entry(key)
            .or_default();
        bucket_add(bucket, observer);
    }

    /// Remove `(subject, key, observer)`, pruning emptied branches. No-op
    /// when the triple was never present.
    pub fn remove(&mut self, subject: SubjectId, key: &Key, observer: &Observer) {
        let Some(keys) = self.subjects.get_mut(&subject) else {
            return;
        };
        if let Some(bucket) = keys.get_mut(key) {
            bucket_remove(bucket, observer);
            if bucket.is_empty() {
                keys.remove(key);
            }
        }
        if keys.is_empty() {
            self.subjects.remove(&subject);
        }
    }

    /// Whether the triple is currently registered.
    #[must_use]
    pub fn contains(&self, subject: SubjectId, key: &Key, observer: &Observer) -> bool {
        self.subjects
            .get(&subject)
            .and_then(|keys| keys.get(key))
            .is_some_and(|bucket| bucket.iter().any(|o| o.ptr_eq(observer)))
    }

    /// A copy of the current bucket for `(subject, key)`; empty when absent.
    #[must_use]
    pub fn snapshot(&self, subject: SubjectId, key: &Key) -> Vec<Observer> {
        self.subjects
            .get(&subject)
            .and_then(|keys| keys.get(key))
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every bucket belonging to `subject`.
    pub fn purge_subject(&mut self, subject: SubjectId) {
        self.subjects.remove(&subject);
    }

    /// Number of subjects with at least one live bucket.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Number of observers registered under `(subject, key)`.
    #[must_use]
    pub fn observer_count(&self, subject: SubjectId, key: &Key) -> usize {
        self.subjects
            .get(&subject)
            .and_then(|keys| keys.get(key))
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// One-level store for global subscriptions.
#[derive(Default)]
pub struct GlobalRegistry {
    keys: AHashMap<Key, Vec<Observer>>,
}

impl GlobalRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(key, observer)`. Re-adding an existing member is a no-op.
    pub fn add(&mut self, key: Key, observer: &Observer) {
        bucket_add(self.keys.entry(key).or_default(), observer);
    }

    /// Remove `(key, observer)`, pruning an emptied bucket. No-op when the
    /// pair was never present.
    pub fn remove(&mut self, key: &Key, observer: &Observer) {
        if let Some(bucket) = self.keys.get_mut(key) {
            bucket_remove(bucket, observer);
            if bucket.is_empty() {
                self.keys.remove(key);
            }
        }
    }

    /// Whether the pair is currently registered.
    #[must_use]
    pub fn contains(&self, key: &Key, observer: &Observer) -> bool {
        self.keys
            .get(key)
            .is_some_and(|bucket| bucket.iter().any(|o| o.ptr_eq(observer)))
    }

    /// A copy of the current bucket for `key`; empty when absent.
    #[must_use]
    pub fn snapshot(&self, key: &Key) -> Vec<Observer> {
        self.keys.get(key).cloned().unwrap_or_default()
    }

    /// Number of keys with at least one observer.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Number of observers registered under `key`.
    #[must_use]
    pub fn observer_count(&self, key: &Key) -> usize {
        self.keys.get(key).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
