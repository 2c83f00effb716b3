#![forbid(unsafe_code)]

//! Bindings: declared read/write operations and observer lifecycle.
//!
//! This crate sits between domain objects and UI observers:
//!
//! - [`getter`] / [`setter`] / [`setter_async`] pair a plain function with
//!   its fixed dependency or trigger key list, as inert metadata: the
//!   function's calling convention is unchanged and the hub never sees the
//!   wrapper.
//! - [`ReadBinding`] subscribes a redraw callback under an accessor's
//!   declared deps for exactly the lifetime of one UI observer, and pulls
//!   fresh values on demand.
//! - [`WriteBinding`] / [`AsyncWriteBinding`] run a mutator and, only on
//!   success, tell the hub to notify exactly the mutator's declared
//!   triggers.
//!
//! # Invariants
//!
//! 1. No subscription outlives its owning binding.
//! 2. A binding's value is never cached past a single pull.
//! 3. A failed mutation propagates its error unchanged and produces zero
//!    notifications.

pub mod binding;
pub mod decl;

pub use binding::{AsyncWriteBinding, ReadBinding, WriteBinding};
pub use decl::{Accessor, AsyncMutator, MutateFuture, Mutator, getter, setter, setter_async};
