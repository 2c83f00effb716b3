#![forbid(unsafe_code)]

//! Patchboard public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use patchboard_bind as bind;
    pub use patchboard_core as core;

    pub use patchboard_bind::{
        Accessor, AsyncMutator, AsyncWriteBinding, Mutator, ReadBinding, WriteBinding, getter,
        setter, setter_async,
    };
    pub use patchboard_core::{Hub, Key, Observer, Subject, SubjectId, SubjectTag, Subscription};
}
