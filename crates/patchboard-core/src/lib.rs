#![forbid(unsafe_code)]

//! Core: dependency keys, observer identity, and the subscription hub.
//!
//! This crate is the invalidation index underneath Patchboard's bindings:
//!
//! - [`Key`]: an opaque identifier for one unit of observable state, either
//!   scoped to a subject or global (reserved `*` prefix).
//! - [`Observer`]: a zero-argument "recompute now" callback handle, compared
//!   by reference identity.
//! - [`SubjectId`] / [`SubjectTag`] / [`Subject`]: stable identity for the
//!   domain objects state belongs to.
//! - [`ScopedRegistry`] / [`GlobalRegistry`]: exact storage with automatic
//!   pruning of empty branches.
//! - [`Hub`]: the subscription manager: `subscribe`, `notify`, and the RAII
//!   [`Subscription`] guard.
//!
//! # Architecture
//!
//! A [`Hub`] is an explicit, owned instance (`Rc<RefCell<..>>` inside, cheap
//! to clone); there is no ambient singleton, so independent application
//! instances and independent tests never observe each other's subscriptions.
//! Observers are never pushed values: a notification only tells them their
//! cached value is stale, and they pull the fresh value by re-running their
//! read path.
//!
//! # Invariants
//!
//! 1. A registry entry exists iff some currently-subscribed observer
//!    requested it; emptied buckets and subject entries are pruned
//!    immediately.
//! 2. Re-registering an identical (subject, key, observer) triple is a
//!    no-op (set semantics).
//! 3. Global registrations match notifications on their key from **any**
//!    subject, including subjects the hub has never seen.
//! 4. A notification pass iterates a snapshot taken before any callback
//!    runs; callbacks may freely subscribe and unsubscribe mid-pass.

pub mod hub;
pub mod key;
pub mod observer;
pub mod registry;
pub mod subject;

pub use hub::{Hub, Subscription};
pub use key::{GLOBAL_MARKER, Key};
pub use observer::Observer;
pub use registry::{GlobalRegistry, ScopedRegistry};
pub use subject::{Subject, SubjectId, SubjectTag};
