//! Entity ownership and the world tick.
//!
//! The [`EntityManager`] owns every entity in creation order. Destruction is
//! deferred: [`EntityManager::destroy`] only queues the entity, which is then
//! skipped by updates and purged at the end of the next
//! [`tick`](EntityManager::tick). Nothing is ever removed from the entity
//! list while it is being iterated.

use std::collections::HashMap;

use engine_component::{Entity, EntityAllocator, EntityId};
use engine_event::Event;
use tracing::{debug, info, warn};

/// What one [`EntityManager::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Entities whose update pass ran (active and not queued for
    /// destruction).
    pub updated: usize,
    /// Events emitted by components during the tick, in emission order.
    /// Only filled by [`EntityManager::tick`].
    pub events: Vec<Event>,
    /// Entities purged at the end of the tick, in creation order.
    pub destroyed: Vec<EntityId>,
}

/// Owns the set of entities and drives their updates.
#[derive(Debug, Default)]
pub struct EntityManager {
    /// Entity id allocator.
    allocator: EntityAllocator,
    /// Live entities in creation order.
    entities: Vec<Entity>,
    /// Maps each entity id to its position in `entities`.
    index: HashMap<EntityId, usize>,
    /// Entities queued for destruction at the end of the next tick.
    pending_destroy: Vec<EntityId>,
}

impl EntityManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, active entity with no components.
    pub fn create(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.allocator.allocate();
        let entity = Entity::new(id, name);
        info!(entity = %id, name = entity.name(), "entity created");
        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Queue an entity for destruction at the end of the next tick.
    ///
    /// The entity stops being updated right away but stays queryable until
    /// the purge. Returns `false` (and logs a warning) if the id is unknown.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.index.contains_key(&id) {
            warn!(entity = %id, "destroy requested for unknown entity");
            return false;
        }
        if !self.pending_destroy.contains(&id) {
            debug!(entity = %id, "entity queued for destruction");
            self.pending_destroy.push(id);
        }
        true
    }

    /// Returns `true` if the entity is queued for destruction.
    #[must_use]
    pub fn is_pending_destroy(&self, id: EntityId) -> bool {
        self.pending_destroy.contains(&id)
    }

    /// Returns `true` if the entity exists (including ones queued for
    /// destruction).
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&pos| &self.entities[pos])
    }

    /// Mutably look up an entity.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let pos = *self.index.get(&id)?;
        self.entities.get_mut(pos)
    }

    /// Find the first entity, in creation order, with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.name() == name)
            .map(Entity::id)
    }

    /// Entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of entities, including ones queued for destruction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if there are no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of active entities.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_active()).count()
    }

    /// Run one world tick, collecting emitted events into
    /// [`TickOutcome::events`].
    pub fn tick(&mut self) -> TickOutcome {
        let mut events = Vec::new();
        let mut outcome = self.tick_with(|emitted| events.extend(emitted));
        outcome.events = events;
        outcome
    }

    /// Run one world tick.
    ///
    /// Updates every entity not queued for destruction, in creation order
    /// (inactive entities are a no-op). Right after each entity's update,
    /// `on_emitted` receives the events its components emitted, before the
    /// next entity runs. Finally purges the entities queued for destruction,
    /// including ones whose components requested it during this tick.
    ///
    /// [`TickOutcome::events`] is left empty; the events went to
    /// `on_emitted`.
    pub fn tick_with(&mut self, mut on_emitted: impl FnMut(Vec<Event>)) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for entity in &mut self.entities {
            let id = entity.id();
            if self.pending_destroy.contains(&id) {
                continue;
            }
            if entity.is_active() {
                entity.update();
                outcome.updated += 1;
            }
            if entity.destroy_requested() {
                debug!(entity = %id, "entity requested its own destruction");
                self.pending_destroy.push(id);
            }
            let emitted = entity.drain_events();
            if !emitted.is_empty() {
                on_emitted(emitted);
            }
        }

        outcome.destroyed = self.purge();
        outcome
    }

    /// Deliver an event to one entity's components, regardless of its
    /// active state. Returns the events they emitted, or `None` if the
    /// entity is unknown.
    pub fn broadcast(&mut self, id: EntityId, event: &Event) -> Option<Vec<Event>> {
        let Some(entity) = self.get_mut(id) else {
            warn!(entity = %id, kind = %event.kind, "broadcast to unknown entity");
            return None;
        };
        entity.broadcast(event);
        let emitted = entity.drain_events();
        let requested = entity.destroy_requested();
        if requested {
            self.destroy(id);
        }
        Some(emitted)
    }

    /// Deliver an event to every entity in creation order. Returns the
    /// events their components emitted.
    pub fn broadcast_all(&mut self, event: &Event) -> Vec<Event> {
        let mut emitted = Vec::new();
        for entity in &mut self.entities {
            entity.broadcast(event);
            if entity.destroy_requested() && !self.pending_destroy.contains(&entity.id()) {
                self.pending_destroy.push(entity.id());
            }
            emitted.extend(entity.drain_events());
        }
        emitted
    }

    /// Remove queued entities and rebuild the index.
    fn purge(&mut self) -> Vec<EntityId> {
        if self.pending_destroy.is_empty() {
            return Vec::new();
        }

        let pending = std::mem::take(&mut self.pending_destroy);
        let mut destroyed = Vec::with_capacity(pending.len());
        self.entities.retain(|e| {
            let doomed = pending.contains(&e.id());
            if doomed {
                destroyed.push(e.id());
            }
            !doomed
        });

        self.index.clear();
        for (pos, entity) in self.entities.iter().enumerate() {
            self.index.insert(entity.id(), pos);
        }

        for id in &destroyed {
            info!(entity = %id, "entity destroyed");
        }
        destroyed
    }
}
