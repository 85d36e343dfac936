//! # engine_component
//!
//! The "C" in the runtime: what a component is, how an entity stores its
//! components, and how an entity drives them.
//!
//! This crate provides:
//!
//! - [`Component`] trait: the `{update, handle_event}` capability contract.
//! - [`ComponentKind`]: stable FNV-1a kind tags used as storage keys.
//! - [`ComponentRegistry`]: ordered, kind-indexed, one-per-kind storage.
//! - [`ComponentHandle`]: generation-checked references that detect
//!   replacement.
//! - [`Entity`] / [`EntityId`] / [`EntityAllocator`]: identity and the
//!   per-entity update and broadcast passes.
//! - [`Owner`]: what a running component sees of its entity.

pub mod component;
pub mod entity;
pub mod owner;
pub mod registry;

pub use component::{AsAny, Component, ComponentKind};
pub use entity::{Entity, EntityAllocator, EntityId};
pub use owner::Owner;
pub use registry::{ComponentHandle, ComponentRegistry};
