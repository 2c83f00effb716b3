#![forbid(unsafe_code)]

//! Declarative wrappers: functions paired with their dependency keys.
//!
//! An [`Accessor`] is a pure read function plus the fixed list of keys it
//! depends on; a [`Mutator`] / [`AsyncMutator`] is a write function plus the
//! fixed list of keys it triggers. Key lists are declared at definition
//! time, never computed per call. The wrappers are pure metadata carriers:
//! the binding layer reads the lists to know what to subscribe to or what
//! to notify, and the wrapped function runs exactly as it would unwrapped.
//!
//! Rust does not allow attaching fields to a function value, so the wrapper
//! is a small paired struct over a shared function allocation. That shared
//! allocation doubles as the wrapper's identity ([`Accessor::ptr_eq`]),
//! which is what rebind detection compares.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use patchboard_core::Key;

/// Boxed single-threaded future returned by async mutators.
pub type MutateFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>>>>;

fn collect_keys<I, K>(keys: I) -> Rc<[Key]>
where
    I: IntoIterator<Item = K>,
    K: Into<Key>,
{
    keys.into_iter().map(Into::into).collect()
}

// ─── Accessor ────────────────────────────────────────────────────────────────

/// A pure read function with its declared dependency keys.
pub struct Accessor<S, T> {
    read: Rc<dyn Fn(&S) -> T>,
    deps: Rc<[Key]>,
}

/// Declare read dependencies for `read`.
pub fn getter<S, T, I, K>(deps: I, read: impl Fn(&S) -> T + 'static) -> Accessor<S, T>
where
    I: IntoIterator<Item = K>,
    K: Into<Key>,
{
    Accessor {
        read: Rc::new(read),
        deps: collect_keys(deps),
    }
}

impl<S, T> Accessor<S, T> {
    /// The declared dependency keys.
    #[must_use]
    pub fn deps(&self) -> &[Key] {
        &self.deps
    }

    /// Invoke the read function, pulling the current value from `subject`.
    pub fn read(&self, subject: &S) -> T {
        (self.read)(subject)
    }

    /// Identity comparison over the shared function allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.read, &other.read)
    }
}

impl<S, T> Clone for Accessor<S, T> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
            deps: Rc::clone(&self.deps),
        }
    }
}

impl<S, T> fmt::Debug for Accessor<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").field("deps", &self.deps).finish()
    }
}

// ─── Mutator (sync) ──────────────────────────────────────────────────────────

/// A synchronous write function with its declared trigger keys.
pub struct Mutator<S, A, T, E> {
    write: Rc<dyn Fn(&mut S, A) -> Result<T, E>>,
    triggers: Rc<[Key]>,
}

/// Declare trigger keys for a synchronous `write`.
pub fn setter<S, A, T, E, I, K>(
    triggers: I,
    write: impl Fn(&mut S, A) -> Result<T, E> + 'static,
) -> Mutator<S, A, T, E>
where
    I: IntoIterator<Item = K>,
    K: Into<Key>,
{
    Mutator {
        write: Rc::new(write),
        triggers: collect_keys(triggers),
    }
}

impl<S, A, T, E> Mutator<S, A, T, E> {
    /// The declared trigger keys.
    #[must_use]
    pub fn triggers(&self) -> &[Key] {
        &self.triggers
    }

    /// Invoke the write function.
    pub fn write(&self, subject: &mut S, args: A) -> Result<T, E> {
        (self.write)(subject, args)
    }

    /// Identity comparison over the shared function allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.write, &other.write)
    }
}

impl<S, A, T, E> Clone for Mutator<S, A, T, E> {
    fn clone(&self) -> Self {
        Self {
            write: Rc::clone(&self.write),
            triggers: Rc::clone(&self.triggers),
        }
    }
}

impl<S, A, T, E> fmt::Debug for Mutator<S, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("triggers", &self.triggers)
            .finish()
    }
}

// ─── AsyncMutator ────────────────────────────────────────────────────────────

/// An asynchronous write function with its declared trigger keys.
///
/// The write function receives the shared subject handle rather than a
/// borrow, because the mutation spans await points: it must borrow the
/// `RefCell` only between awaits, never across one.
pub struct AsyncMutator<S, A, T, E> {
    write: Rc<dyn Fn(Rc<RefCell<S>>, A) -> MutateFuture<T, E>>,
    triggers: Rc<[Key]>,
}

/// Declare trigger keys for an asynchronous `write`.
pub fn setter_async<S, A, T, E, I, K, F, Fut>(triggers: I, write: F) -> AsyncMutator<S, A, T, E>
where
    I: IntoIterator<Item = K>,
    K: Into<Key>,
    F: Fn(Rc<RefCell<S>>, A) -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    AsyncMutator {
        write: Rc::new(move |subject, args| -> MutateFuture<T, E> {
            Box::pin(write(subject, args))
        }),
        triggers: collect_keys(triggers),
    }
}

impl<S, A, T, E> AsyncMutator<S, A, T, E> {
    /// The declared trigger keys.
    #[must_use]
    pub fn triggers(&self) -> &[Key] {
        &self.triggers
    }

    pub(crate) fn triggers_rc(&self) -> Rc<[Key]> {
        Rc::clone(&self.triggers)
    }

    /// Start the write, returning its future.
    pub fn write(&self, subject: Rc<RefCell<S>>, args: A) -> MutateFuture<T, E> {
        (self.write)(subject, args)
    }

    /// Identity comparison over the shared function allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.write, &other.write)
    }
}

impl<S, A, T, E> Clone for AsyncMutator<S, A, T, E> {
    fn clone(&self) -> Self {
        Self {
            write: Rc::clone(&self.write),
            triggers: Rc::clone(&self.triggers),
        }
    }
}

impl<S, A, T, E> fmt::Debug for AsyncMutator<S, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMutator")
            .field("triggers", &self.triggers)
            .finish()
    }
}
