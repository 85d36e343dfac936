//! Host surface tying entities to the event bus.
//!
//! Components never see the bus. The [`World`] publishes the events an
//! entity's components emit as soon as that entity's update (or broadcast)
//! returns, in emission order, on the calling thread.

use std::cell::RefCell;
use std::rc::Rc;

use engine_component::{Component, Entity, EntityId};
use engine_event::{
    Event, EventBus, Observer, ObserverId, PublishError, PublishReport, Subscription,
};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::manager::EntityManager;

/// Errors returned by the host surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The handle does not name a live entity.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// No entity carries the event's target name.
    #[error("no entity named {0:?}")]
    UnknownTarget(String),
}

/// What one [`World::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number, starting at 1.
    pub tick_id: u64,
    /// Entities whose update pass ran.
    pub updated: usize,
    /// Events emitted by components and published.
    pub published: usize,
    /// Observer notifications that failed or were skipped.
    pub observer_failures: usize,
    /// Entities purged at the end of the tick.
    pub destroyed: Vec<EntityId>,
}

/// Entities plus the event bus they publish to.
#[derive(Debug, Default)]
pub struct World {
    /// Entity storage.
    entities: EntityManager,
    /// The bus emitted events go out on.
    bus: EventBus,
    /// Ticks run so far.
    tick_id: u64,
}

impl World {
    /// Create an empty world with a default bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world whose bus follows `config`.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::with_bus(EventBus::with_config(config.bus))
    }

    /// Create an empty world around an existing bus. Clones of the bus
    /// share its subscribers.
    #[must_use]
    pub fn with_bus(bus: EventBus) -> Self {
        Self {
            entities: EntityManager::new(),
            bus,
            tick_id: 0,
        }
    }

    /// Ticks run so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The world's event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The entity manager.
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Mutable access to the entity manager.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Create a new entity.
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.entities.create(name)
    }

    /// Look up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutably look up an entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Attach a component to an entity, replacing any component of the same
    /// kind.
    pub fn attach_component<K: Component>(
        &mut self,
        id: EntityId,
        component: K,
    ) -> Result<&mut K, WorldError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(WorldError::UnknownEntity(id))?;
        Ok(entity.attach(component))
    }

    /// Look up a component. Absent when either the entity or the component
    /// is missing.
    #[must_use]
    pub fn get_component<K: Component>(&self, id: EntityId) -> Option<&K> {
        self.entities.get(id)?.get::<K>()
    }

    /// Mutably look up a component.
    pub fn get_component_mut<K: Component>(&mut self, id: EntityId) -> Option<&mut K> {
        self.entities.get_mut(id)?.get_mut::<K>()
    }

    /// Queue an entity for destruction at the end of the next tick.
    /// Unknown handles are reported and ignored.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entities.destroy(id)
    }

    /// Run one tick: update entities in creation order, publishing what
    /// each one emitted before the next one runs, then purge destroyed
    /// entities.
    pub fn tick(&mut self) -> TickSummary {
        self.tick_id += 1;

        let bus = &self.bus;
        let mut published = 0;
        let mut observer_failures = 0;
        let outcome = self.entities.tick_with(|emitted| {
            for event in &emitted {
                observer_failures += publish_emitted(bus, event);
                published += 1;
            }
        });

        let summary = TickSummary {
            tick_id: self.tick_id,
            updated: outcome.updated,
            published,
            observer_failures,
            destroyed: outcome.destroyed,
        };
        debug!(
            tick_id = summary.tick_id,
            updated = summary.updated,
            published = summary.published,
            destroyed = summary.destroyed.len(),
            "tick complete"
        );
        summary
    }

    /// Publish an event to every subscriber.
    pub fn publish(&self, event: &Event) -> Result<PublishReport, PublishError> {
        self.bus.publish(event)
    }

    /// Deliver an event to one entity's components, then publish whatever
    /// they emitted in response.
    pub fn broadcast(&mut self, id: EntityId, event: &Event) -> Result<usize, WorldError> {
        let emitted = self
            .entities
            .broadcast(id, event)
            .ok_or(WorldError::UnknownEntity(id))?;
        for reply in &emitted {
            publish_emitted(&self.bus, reply);
        }
        Ok(emitted.len())
    }

    /// Deliver an event to the entity named by its `target`.
    pub fn deliver(&mut self, event: &Event) -> Result<EntityId, WorldError> {
        let id = self
            .entities
            .find_by_name(&event.target)
            .ok_or_else(|| WorldError::UnknownTarget(event.target.clone()))?;
        self.broadcast(id, event)?;
        Ok(id)
    }

    /// Subscribe an observer. Idempotent; pair with
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<O: Observer + 'static>(&self, observer: &Rc<RefCell<O>>) -> ObserverId {
        self.bus.subscribe(observer)
    }

    /// Subscribe an observer for as long as the returned token lives.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe_scoped<O: Observer + 'static>(
        &self,
        observer: &Rc<RefCell<O>>,
    ) -> Subscription {
        self.bus.subscribe_scoped(observer)
    }

    /// Unsubscribe an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe<O: Observer + 'static>(&self, observer: &Rc<RefCell<O>>) -> bool {
        self.bus.unsubscribe(observer)
    }
}

/// Publish an event on behalf of a component, returning how many observers
/// failed or were skipped.
fn publish_emitted(bus: &EventBus, event: &Event) -> usize {
    match bus.publish(event) {
        Ok(report) => report.failed + report.skipped,
        Err(err) => {
            warn!(kind = %event.kind, source = %event.source, %err, "emitted event dropped");
            0
        }
    }
}
