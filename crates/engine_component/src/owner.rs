//! The view a running component gets of its owning entity.

use engine_event::Event;

use crate::component::Component;
use crate::entity::EntityId;
use crate::registry::ComponentRegistry;

/// Access to the owning entity while one of its components runs.
///
/// The running component is lifted out of its slot for the duration of the
/// call, so sibling lookups never alias it: `get::<Self>()` from inside a
/// component's own update yields `None`.
pub struct Owner<'a> {
    pub(crate) id: EntityId,
    pub(crate) name: &'a str,
    pub(crate) active: &'a mut bool,
    pub(crate) destroy_requested: &'a mut bool,
    pub(crate) components: &'a mut ComponentRegistry,
    pub(crate) outbox: &'a mut Vec<Event>,
}

impl Owner<'_> {
    /// The owning entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The owning entity's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Whether the owning entity still takes part in updates.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self.active
    }

    /// Deactivate the owning entity. Components later in the current pass
    /// still run; later ticks skip the entity.
    pub fn deactivate(&mut self) {
        if *self.active {
            tracing::debug!(entity = %self.id, name = self.name, "entity deactivated");
        }
        *self.active = false;
    }

    /// Ask the entity manager to destroy the owning entity at the end of
    /// the current tick.
    pub fn request_destroy(&mut self) {
        *self.destroy_requested = true;
    }

    /// Queue an event for the host to publish.
    pub fn emit(&mut self, event: Event) {
        self.outbox.push(event);
    }

    /// Look up a sibling component.
    #[must_use]
    pub fn get<K: Component>(&self) -> Option<&K> {
        self.components.get::<K>()
    }

    /// Mutably look up a sibling component.
    #[must_use]
    pub fn get_mut<K: Component>(&mut self) -> Option<&mut K> {
        self.components.get_mut::<K>()
    }

    /// Returns `true` if a sibling of kind `K` is attached.
    #[must_use]
    pub fn has<K: Component>(&self) -> bool {
        self.components.contains::<K>()
    }
}

impl std::fmt::Debug for Owner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Owner")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &*self.active)
            .finish_non_exhaustive()
    }
}
