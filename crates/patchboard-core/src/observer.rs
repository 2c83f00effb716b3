#![forbid(unsafe_code)]

//! Observer handles.
//!
//! An [`Observer`] wraps a zero-argument callback meaning "your cached value
//! is stale, recompute." The hub never passes values to it; the owning
//! binding pulls the fresh value itself by re-running its accessor.
//!
//! Observers are compared by reference identity ([`Observer::ptr_eq`]):
//! clones of one handle are the same observer, two handles built from
//! textually identical closures are not. This is what gives registry buckets
//! set semantics without requiring callbacks to be `Eq`.

use std::fmt;
use std::rc::Rc;

/// A cloneable handle around a "recompute now" callback.
#[derive(Clone)]
pub struct Observer {
    callback: Rc<dyn Fn()>,
}

impl Observer {
    /// Wrap a callback. Each call creates a new identity; clone the handle
    /// to register the same observer in several places.
    #[must_use]
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback.
    pub fn invoke(&self) {
        (self.callback)();
    }

    /// Identity comparison: true iff both handles share one allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observer")
            .field(&Rc::as_ptr(&self.callback))
            .finish()
    }
}
