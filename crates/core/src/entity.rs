//! Entity trait: records that keep their identity while their contents change.
//!
//! A group stays the same group as members join; a debt pair does not need an
//! identity and is a value instead (see [`crate::ValueObject`]).

/// Something addressed by a stable identifier.
pub trait Entity {
    /// Identifier type, usually one of the newtypes in [`crate::id`].
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
