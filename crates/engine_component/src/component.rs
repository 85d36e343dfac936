//! Core [`Component`] trait and the [`ComponentKind`] tag.
//!
//! Every capability attached to an entity implements [`Component`]. Lookup
//! never inspects the type hierarchy: each component type names itself via
//! [`Component::type_name`], and that name is hashed into a stable
//! [`ComponentKind`] used as the storage key.
//!
//! ## Kind Identity
//!
//! [`ComponentKind`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm, so the same name always yields the same
//! kind across runs and builds.

use std::any::Any;

use engine_event::Event;
use serde::{Deserialize, Serialize};

use crate::owner::Owner;

/// A stable tag distinguishing component types at runtime, derived from the
/// component's name using FNV-1a 64-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentKind(pub u64);

impl ComponentKind {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentKind`] for a component name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentKind`] for a component type `K`.
    #[must_use]
    pub fn of<K: Component>() -> Self {
        Self::from_name(K::type_name())
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Kind({:#018x})", self.0)
    }
}

/// Type-erasure helper implemented for every `'static` type.
///
/// Lets the registry recover a concrete component from its
/// `Box<dyn Component>` after the kind tag has selected the slot.
pub trait AsAny: Any {
    /// Borrow as [`Any`].
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert a box into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A capability unit owned by exactly one entity.
///
/// Components are updated once per tick, in attachment order, while their
/// entity is active, and receive every event broadcast to their entity. The
/// [`Owner`] argument gives access to the owning entity: its identity and
/// active flag, sibling components, and an outbox for emitted events.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, Owner};
///
/// struct Ticker {
///     ticks: u32,
/// }
///
/// impl Component for Ticker {
///     fn type_name() -> &'static str {
///         "Ticker"
///     }
///
///     fn update(&mut self, _owner: &mut Owner<'_>) {
///         self.ticks += 1;
///     }
/// }
/// ```
pub trait Component: AsAny {
    /// A stable, human-readable name for this component type.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Returns the [`ComponentKind`] for this component type.
    fn kind() -> ComponentKind
    where
        Self: Sized,
    {
        ComponentKind::from_name(Self::type_name())
    }

    /// Per-tick behaviour.
    fn update(&mut self, owner: &mut Owner<'_>);

    /// React to an event broadcast to the owning entity. Kinds a component
    /// does not care about are ignored.
    fn handle_event(&mut self, _event: &Event, _owner: &mut Owner<'_>) {}
}

/// Downcast an erased component to `K`.
pub(crate) fn downcast_ref<'a, K: Component>(
    component: &'a (dyn Component + 'static),
) -> Option<&'a K> {
    component.as_any().downcast_ref::<K>()
}

/// Mutably downcast an erased component to `K`.
pub(crate) fn downcast_mut<'a, K: Component>(
    component: &'a mut (dyn Component + 'static),
) -> Option<&'a mut K> {
    component.as_any_mut().downcast_mut::<K>()
}
