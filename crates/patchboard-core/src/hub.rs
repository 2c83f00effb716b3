#![forbid(unsafe_code)]

//! The subscription manager.
//!
//! [`Hub`] owns both registries and is the only component with
//! invalidation-fan-out logic. `subscribe` routes each key to the right
//! registry and returns a [`Subscription`] guard; `notify` invokes every
//! observer matching the changed keys.
//!
//! # Design
//!
//! A `Hub` is a cheap cloneable handle over `Rc<RefCell<..>>` shared state,
//! constructed explicitly by the embedder, never a module-level singleton.
//! All registry borrows are transient: no `RefCell` borrow is held while an
//! observer callback runs, so callbacks may re-enter `subscribe`,
//! `unsubscribe`, and `notify` freely.
//!
//! # Invariants
//!
//! 1. `subscribe`, `unsubscribe`, and `notify` are total: unknown subjects,
//!    keys, and observers are no-ops, never errors.
//! 2. A notification pass iterates a snapshot collected across all keys
//!    before any callback runs. Each snapshot entry is re-checked against
//!    the live registry just before invocation: an observer unsubscribed by
//!    an earlier callback in the same pass is skipped, and an observer
//!    subscribed during the pass first fires on the next one.
//! 3. No cross-key dedup: an observer independently registered under two
//!    keys passed in one `notify` call is invoked once per matching
//!    registration. Recompute callbacks are idempotent pulls, so repeated
//!    invocation is harmless.
//! 4. `Subscription::unsubscribe` removes exactly the routes its
//!    `subscribe` call registered, and is idempotent.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::key::Key;
use crate::observer::Observer;
use crate::registry::{GlobalRegistry, ScopedRegistry};
use crate::subject::SubjectId;

/// Where one registration landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Scoped(SubjectId),
    Global,
}

#[derive(Default)]
struct HubInner {
    scoped: ScopedRegistry,
    global: GlobalRegistry,
}

/// The subscription manager: an explicit, owned invalidation index.
///
/// Cloning yields another handle to the **same** hub.
#[derive(Clone, Default)]
pub struct Hub {
    inner: Rc<RefCell<HubInner>>,
}

impl Hub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer` under every key in `keys`.
    ///
    /// Global-marked keys go to the global registry regardless of
    /// `subject`; scoped keys go to the paired registry under `subject`.
    /// A scoped key passed with no subject scope has nowhere to land and is
    /// skipped. Registration is idempotent per (subject, key, observer).
    ///
    /// The returned [`Subscription`] removes every registration made here
    /// when dropped or explicitly unsubscribed.
    pub fn subscribe<I, K>(
        &self,
        subject: Option<SubjectId>,
        keys: I,
        observer: Observer,
    ) -> Subscription
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let mut routes: Vec<(Route, Key)> = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            for key in keys {
                let key = key.into();
                if key.is_global() {
                    inner.global.add(key.clone(), &observer);
                    routes.push((Route::Global, key));
                } else if let Some(sid) = subject {
                    inner.scoped.add(sid, key.clone(), &observer);
                    routes.push((Route::Scoped(sid), key));
                } else {
                    debug!(key = %key, "scoped key subscribed without a subject; skipped");
                }
            }
        }
        trace!(
            subject = subject.map(SubjectId::raw),
            routes = routes.len(),
            "subscribed"
        );
        Subscription {
            hub: Rc::downgrade(&self.inner),
            routes: RefCell::new(routes),
            observer,
        }
    }

    /// Invoke every observer matching `keys`.
    ///
    /// For each key both the scoped bucket for `(subject, key)` and the
    /// global bucket for the key are consulted; a single call may fan out
    /// to both kinds. Invocation order within a pass is unspecified.
    pub fn notify(&self, subject: Option<SubjectId>, keys: &[Key]) {
        let mut pass: Vec<(Route, Key, Observer)> = Vec::new();
        {
            let inner = self.inner.borrow();
            for key in keys {
                if let Some(sid) = subject {
                    for observer in inner.scoped.snapshot(sid, key) {
                        pass.push((Route::Scoped(sid), key.clone(), observer));
                    }
                }
                for observer in inner.global.snapshot(key) {
                    pass.push((Route::Global, key.clone(), observer));
                }
            }
        }
        trace!(
            subject = subject.map(SubjectId::raw),
            keys = keys.len(),
            matched = pass.len(),
            "notify"
        );
        for (route, key, observer) in pass {
            let live = {
                let inner = self.inner.borrow();
                match route {
                    Route::Scoped(sid) => inner.scoped.contains(sid, &key, &observer),
                    Route::Global => inner.global.contains(&key, &observer),
                }
            };
            if live {
                observer.invoke();
            }
        }
    }

    /// Purge every scoped bucket belonging to a destroyed subject.
    ///
    /// Wired by the subject's owner to its teardown. Global registrations
    /// are unaffected.
    pub fn retire_subject(&self, subject: SubjectId) {
        self.inner.borrow_mut().scoped.purge_subject(subject);
        debug!(subject = subject.raw(), "retired");
    }

    // ── Introspection ────────────────────────────────────────────────

    /// Number of subjects with at least one scoped registration.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.inner.borrow().scoped.subject_count()
    }

    /// Number of observers registered under `(subject, key)`.
    #[must_use]
    pub fn scoped_observers(&self, subject: SubjectId, key: &Key) -> usize {
        self.inner.borrow().scoped.observer_count(subject, key)
    }

    /// Number of observers registered under the global `key`.
    #[must_use]
    pub fn global_observers(&self, key: &Key) -> usize {
        self.inner.borrow().global.observer_count(key)
    }

    /// Whether both registries are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.borrow();
        inner.scoped.is_empty() && inner.global.is_empty()
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Hub")
            .field("subjects", &inner.scoped.subject_count())
            .field("global_keys", &inner.global.key_count())
            .finish()
    }
}

/// Guard for one `subscribe` call.
///
/// Removes its registrations when dropped; [`unsubscribe`](Self::unsubscribe)
/// does the same eagerly and is safe to call any number of times. A guard
/// outliving its [`Hub`] is inert.
pub struct Subscription {
    hub: Weak<RefCell<HubInner>>,
    routes: RefCell<Vec<(Route, Key)>>,
    observer: Observer,
}

impl Subscription {
    /// Remove the observer from every route this subscription registered.
    /// Second and later calls are no-ops.
    pub fn unsubscribe(&self) {
        let routes = std::mem::take(&mut *self.routes.borrow_mut());
        if routes.is_empty() {
            return;
        }
        let Some(inner) = self.hub.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        for (route, key) in &routes {
            match route {
                Route::Scoped(sid) => inner.scoped.remove(*sid, key, &self.observer),
                Route::Global => inner.global.remove(key, &self.observer),
            }
        }
        trace!(routes = routes.len(), "unsubscribed");
    }

    /// Whether any registration is still held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.routes.borrow().is_empty()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("routes", &self.routes.borrow().len())
            .finish()
    }
}
