#![forbid(unsafe_code)]

//! Binding layer: the only component aware of a UI observer's lifecycle.
//!
//! A binding links one UI observer to a subject plus a declared operation
//! for exactly as long as the observer is mounted:
//!
//! - [`ReadBinding`] subscribes the observer's redraw callback under the
//!   accessor's declared deps on construction, re-routes the subscription
//!   when the subject or accessor identity changes, and unsubscribes on
//!   drop. The bound value is never cached; every [`get`](ReadBinding::get)
//!   re-invokes the accessor.
//! - [`WriteBinding`] and [`AsyncWriteBinding`] run the mutator and notify
//!   the hub with the declared triggers only after it reports success.
//!
//! # Invariants
//!
//! 1. Per binding the states are exactly Unbound → Bound (construct /
//!    rebind) and Bound → Unbound (rebind / drop); no transient state is
//!    observable.
//! 2. A failed mutation returns its error unchanged and produces zero
//!    notifications.
//! 3. An async mutation's notification does not depend on its originating
//!    binding still existing: the returned future owns everything it needs,
//!    and still-bound observers are notified even if the binding was
//!    dropped mid-flight.
//!
//! # Concurrency
//!
//! Concurrent async mutations on one subject are not serialized: they
//! interleave at await points, and whichever resolves last determines the
//! final subject state and the final notification pass (last-to-resolve
//! wins, independent of invocation order).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use patchboard_core::{Hub, Observer, Subject, SubjectId, Subscription};

use crate::decl::{Accessor, AsyncMutator, MutateFuture, Mutator};

// ─── ReadBinding ─────────────────────────────────────────────────────────────

/// Lifecycle-scoped link between one UI observer and a subject + accessor.
pub struct ReadBinding<S: Subject, T> {
    hub: Hub,
    subject: Rc<RefCell<S>>,
    subject_id: SubjectId,
    accessor: Accessor<S, T>,
    observer: Observer,
    subscription: Subscription,
}

impl<S: Subject, T> ReadBinding<S, T> {
    /// Activate: subscribe `on_invalidate` under the accessor's deps.
    ///
    /// The callback is told only "recompute"; it should schedule a redraw
    /// that pulls the fresh value via [`get`](Self::get).
    pub fn bind(
        hub: &Hub,
        subject: Rc<RefCell<S>>,
        accessor: Accessor<S, T>,
        on_invalidate: impl Fn() + 'static,
    ) -> Self {
        let observer = Observer::new(on_invalidate);
        let subject_id = subject.borrow().subject_id();
        let subscription = hub.subscribe(
            Some(subject_id),
            accessor.deps().iter().cloned(),
            observer.clone(),
        );
        Self {
            hub: hub.clone(),
            subject,
            subject_id,
            accessor,
            observer,
            subscription,
        }
    }

    /// Pull the current value by re-invoking the accessor. Never cached.
    #[must_use]
    pub fn get(&self) -> T {
        self.accessor.read(&self.subject.borrow())
    }

    /// Re-route the subscription if the subject identity or the accessor
    /// identity changed; no-op otherwise.
    ///
    /// The old registration is removed before the new one is made, so no
    /// stale route survives a dependency change.
    pub fn rebind(&mut self, subject: Rc<RefCell<S>>, accessor: Accessor<S, T>) {
        let subject_id = subject.borrow().subject_id();
        if subject_id == self.subject_id && accessor.ptr_eq(&self.accessor) {
            return;
        }
        debug!(
            old = self.subject_id.raw(),
            new = subject_id.raw(),
            "rebind"
        );
        self.subscription.unsubscribe();
        self.subscription = self.hub.subscribe(
            Some(subject_id),
            accessor.deps().iter().cloned(),
            self.observer.clone(),
        );
        self.subject = subject;
        self.subject_id = subject_id;
        self.accessor = accessor;
    }

    /// The bound subject's identity.
    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    /// Deactivate. Equivalent to dropping the binding.
    pub fn unbind(self) {}
}

impl<S: Subject, T> fmt::Debug for ReadBinding<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadBinding")
            .field("subject", &self.subject_id.raw())
            .field("deps", &self.accessor.deps())
            .finish()
    }
}

// ─── WriteBinding (sync) ─────────────────────────────────────────────────────

/// Link between a subject and a synchronous mutator.
pub struct WriteBinding<S: Subject, A, T, E> {
    hub: Hub,
    subject: Rc<RefCell<S>>,
    subject_id: SubjectId,
    mutator: Mutator<S, A, T, E>,
}

impl<S: Subject, A, T, E> WriteBinding<S, A, T, E> {
    pub fn bind(hub: &Hub, subject: Rc<RefCell<S>>, mutator: Mutator<S, A, T, E>) -> Self {
        let subject_id = subject.borrow().subject_id();
        Self {
            hub: hub.clone(),
            subject,
            subject_id,
            mutator,
        }
    }

    /// Run the mutator; on success, notify exactly its declared triggers.
    ///
    /// On failure the error is returned unchanged and nothing is notified.
    pub fn mutate(&self, args: A) -> Result<T, E> {
        let out = {
            let mut subject = self.subject.borrow_mut();
            self.mutator.write(&mut subject, args)
        };
        match &out {
            Ok(_) => self
                .hub
                .notify(Some(self.subject_id), self.mutator.triggers()),
            Err(_) => debug!(subject = self.subject_id.raw(), "mutation failed"),
        }
        out
    }

    /// The bound subject's identity.
    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }
}

impl<S: Subject, A, T, E> fmt::Debug for WriteBinding<S, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteBinding")
            .field("subject", &self.subject_id.raw())
            .field("triggers", &self.mutator.triggers())
            .finish()
    }
}

// ─── AsyncWriteBinding ───────────────────────────────────────────────────────

/// Link between a subject and an asynchronous mutator.
///
/// Concurrent mutations on one subject are not serialized; see the module
/// docs for the last-to-resolve-wins consequence.
pub struct AsyncWriteBinding<S: Subject, A, T, E> {
    hub: Hub,
    subject: Rc<RefCell<S>>,
    subject_id: SubjectId,
    mutator: AsyncMutator<S, A, T, E>,
}

impl<S, A, T, E> AsyncWriteBinding<S, A, T, E>
where
    S: Subject + 'static,
    T: 'static,
    E: 'static,
{
    pub fn bind(hub: &Hub, subject: Rc<RefCell<S>>, mutator: AsyncMutator<S, A, T, E>) -> Self {
        let subject_id = subject.borrow().subject_id();
        Self {
            hub: hub.clone(),
            subject,
            subject_id,
            mutator,
        }
    }

    /// Start the mutator; on resolution with success, notify exactly its
    /// declared triggers.
    ///
    /// The returned future owns clones of the hub, subject handle, and
    /// trigger list; it does not borrow the binding, so the binding may be
    /// dropped while the mutation is in flight. A late success still
    /// mutates the subject and still notifies the remaining observers.
    pub fn mutate(&self, args: A) -> MutateFuture<T, E> {
        let hub = self.hub.clone();
        let subject_id = self.subject_id;
        let triggers = self.mutator.triggers_rc();
        let fut = self.mutator.write(Rc::clone(&self.subject), args);
        Box::pin(async move {
            let out = fut.await;
            match &out {
                Ok(_) => hub.notify(Some(subject_id), &triggers),
                Err(_) => debug!(subject = subject_id.raw(), "async mutation failed"),
            }
            out
        })
    }

    /// The bound subject's identity.
    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }
}

impl<S: Subject, A, T, E> fmt::Debug for AsyncWriteBinding<S, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncWriteBinding")
            .field("subject", &self.subject_id.raw())
            .field("triggers", &self.mutator.triggers())
            .finish()
    }
}
