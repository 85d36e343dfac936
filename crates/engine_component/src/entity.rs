//! Entity identity, allocation, and the [`Entity`] aggregate.
//!
//! An [`EntityId`] is a lightweight `u64` identifier. An [`Entity`] pairs an
//! id and a name with an active flag and an ordered set of components, and
//! drives those components through per-tick updates and event broadcasts.

use std::panic::{self, AssertUnwindSafe};

use engine_event::Event;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::component::{Component, ComponentKind};
use crate::owner::Owner;
use crate::registry::{ComponentHandle, ComponentRegistry};

/// A unique entity identifier.
///
/// Ids are never reused, so an id that outlives its entity simply stops
/// resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1 (0 is reserved for
    /// [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// An identity with an active flag and an ordered set of components.
///
/// Entities start active. Deactivation is one-way: an inactive entity skips
/// [`update`](Self::update) but still receives
/// [`broadcast`](Self::broadcast), and its components stay queryable.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    active: bool,
    destroy_requested: bool,
    components: ComponentRegistry,
    /// Events emitted by components, waiting for the host to publish them.
    outbox: Vec<Event>,
}

impl Entity {
    /// Create an active entity with no components.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            destroy_requested: false,
            components: ComponentRegistry::new(),
            outbox: Vec::new(),
        }
    }

    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` while the entity takes part in updates.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop updating this entity. There is no way back.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns `true` if a component asked for this entity to be destroyed.
    #[must_use]
    pub fn destroy_requested(&self) -> bool {
        self.destroy_requested
    }

    /// Attach a component; see [`ComponentRegistry::attach`].
    pub fn attach<K: Component>(&mut self, component: K) -> &mut K {
        self.components.attach(component)
    }

    /// Look up a component of kind `K`.
    #[must_use]
    pub fn get<K: Component>(&self) -> Option<&K> {
        self.components.get::<K>()
    }

    /// Mutably look up a component of kind `K`.
    #[must_use]
    pub fn get_mut<K: Component>(&mut self) -> Option<&mut K> {
        self.components.get_mut::<K>()
    }

    /// Take a generation-checked handle to the component of kind `K`.
    #[must_use]
    pub fn handle<K: Component>(&self) -> Option<ComponentHandle<K>> {
        self.components.handle::<K>()
    }

    /// Resolve a handle taken from this entity.
    #[must_use]
    pub fn resolve<K: Component>(&self, handle: ComponentHandle<K>) -> Option<&K> {
        self.components.resolve(handle)
    }

    /// Detach and return the component of kind `K`.
    pub fn detach<K: Component>(&mut self) -> Option<K> {
        self.components.detach::<K>()
    }

    /// Returns `true` if a component of kind `K` is attached.
    #[must_use]
    pub fn has<K: Component>(&self) -> bool {
        self.components.contains::<K>()
    }

    /// The component storage.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Component kinds in attachment order.
    pub fn component_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.kinds()
    }

    /// Run one update pass.
    ///
    /// Does nothing if the entity is inactive. Otherwise every component's
    /// `update` runs in attachment order. A component that deactivates the
    /// entity does not stop the rest of the pass.
    pub fn update(&mut self) {
        if !self.active {
            trace!(entity = %self.id, "skipping inactive entity");
            return;
        }
        self.run_components(|component, owner| component.update(owner));
    }

    /// Deliver an event to every component in attachment order, whether or
    /// not the entity is active.
    pub fn broadcast(&mut self, event: &Event) {
        trace!(entity = %self.id, kind = %event.kind, "broadcasting to components");
        self.run_components(|component, owner| component.handle_event(event, owner));
    }

    /// Take the events emitted by components since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    /// Events emitted by components and not yet drained.
    #[must_use]
    pub fn pending_events(&self) -> &[Event] {
        &self.outbox
    }

    fn run_components(&mut self, mut run: impl FnMut(&mut dyn Component, &mut Owner<'_>)) {
        let Entity {
            id,
            name,
            active,
            destroy_requested,
            components,
            outbox,
        } = self;

        for pos in 0..components.len() {
            let Some(mut component) = components.take(pos) else {
                continue;
            };
            let result = {
                let mut owner = Owner {
                    id: *id,
                    name: name.as_str(),
                    active: &mut *active,
                    destroy_requested: &mut *destroy_requested,
                    components: &mut *components,
                    outbox: &mut *outbox,
                };
                panic::catch_unwind(AssertUnwindSafe(|| run(&mut *component, &mut owner)))
            };
            // The slot gets its component back even if it panicked.
            components.restore(pos, component);
            if let Err(payload) = result {
                panic::resume_unwind(payload);
            }
        }
    }
}
