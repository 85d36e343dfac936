//! Per-entity component storage keyed by [`ComponentKind`].
//!
//! Components live in attachment order (the order they are updated and
//! notified in) with a kind → slot index on the side for O(1) lookup. At
//! most one instance of each kind is stored; attaching a kind that is
//! already present replaces it.
//!
//! Every attachment gets a fresh generation number. A [`ComponentHandle`]
//! remembers the generation it was taken at, so it resolves to `None` once
//! its component has been replaced or detached instead of observing the new
//! value.

use std::collections::HashMap;
use std::marker::PhantomData;

use tracing::debug;

use crate::component::{Component, ComponentKind, downcast_mut, downcast_ref};

struct Slot {
    kind: ComponentKind,
    name: &'static str,
    generation: u64,
    /// `None` only while the component is running.
    component: Option<Box<dyn Component>>,
}

/// A generation-checked reference to a component of kind `K`.
///
/// Handles are plain values; they do not borrow the registry. Resolve them
/// with [`ComponentRegistry::resolve`].
pub struct ComponentHandle<K> {
    kind: ComponentKind,
    generation: u64,
    _marker: PhantomData<fn() -> K>,
}

impl<K> ComponentHandle<K> {
    /// The kind this handle refers to.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// The attachment generation this handle was taken at.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<K> Clone for ComponentHandle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ComponentHandle<K> {}

impl<K> PartialEq for ComponentHandle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.generation == other.generation
    }
}

impl<K> Eq for ComponentHandle<K> {}

impl<K> std::fmt::Debug for ComponentHandle<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("kind", &self.kind)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Ordered, kind-indexed component storage for one entity.
#[derive(Default)]
pub struct ComponentRegistry {
    /// Components in attachment order.
    slots: Vec<Slot>,
    /// Maps each kind to its position in `slots`.
    index: HashMap<ComponentKind, usize>,
    /// Last generation handed out.
    generation: u64,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a component, replacing any existing component of the same
    /// kind.
    ///
    /// The new component goes to the end of the attachment order. A
    /// replaced component is dropped and its handles stop resolving.
    pub fn attach<K: Component>(&mut self, component: K) -> &mut K {
        let kind = K::kind();
        if let Some(pos) = self.index.get(&kind).copied() {
            let old = self.slots.remove(pos);
            self.reindex();
            debug!(
                component = K::type_name(),
                generation = old.generation,
                "replacing component"
            );
        }

        self.generation += 1;
        let pos = self.slots.len();
        self.slots.push(Slot {
            kind,
            name: K::type_name(),
            generation: self.generation,
            component: Some(Box::new(component)),
        });
        self.index.insert(kind, pos);

        match self.slots[pos].component.as_deref_mut().and_then(downcast_mut::<K>) {
            Some(component) => component,
            None => unreachable!("slot {pos} was just filled with a {}", K::type_name()),
        }
    }

    /// Look up the component of kind `K`.
    #[must_use]
    pub fn get<K: Component>(&self) -> Option<&K> {
        let pos = *self.index.get(&K::kind())?;
        self.slots[pos].component.as_deref().and_then(downcast_ref::<K>)
    }

    /// Mutably look up the component of kind `K`.
    #[must_use]
    pub fn get_mut<K: Component>(&mut self) -> Option<&mut K> {
        let pos = *self.index.get(&K::kind())?;
        self.slots[pos]
            .component
            .as_deref_mut()
            .and_then(downcast_mut::<K>)
    }

    /// Returns `true` if a component of kind `K` is attached and available.
    #[must_use]
    pub fn contains<K: Component>(&self) -> bool {
        self.get::<K>().is_some()
    }

    /// Number of components stored under `kind` (always 0 or 1).
    #[must_use]
    pub fn count(&self, kind: ComponentKind) -> usize {
        self.slots.iter().filter(|s| s.kind == kind).count()
    }

    /// Take a generation-checked handle to the component of kind `K`.
    #[must_use]
    pub fn handle<K: Component>(&self) -> Option<ComponentHandle<K>> {
        let pos = *self.index.get(&K::kind())?;
        Some(ComponentHandle {
            kind: self.slots[pos].kind,
            generation: self.slots[pos].generation,
            _marker: PhantomData,
        })
    }

    /// Resolve a handle. Returns `None` if the component it was taken from
    /// has since been replaced or detached.
    #[must_use]
    pub fn resolve<K: Component>(&self, handle: ComponentHandle<K>) -> Option<&K> {
        let pos = *self.index.get(&handle.kind)?;
        let slot = &self.slots[pos];
        if slot.generation != handle.generation {
            return None;
        }
        slot.component.as_deref().and_then(downcast_ref::<K>)
    }

    /// Mutably resolve a handle.
    #[must_use]
    pub fn resolve_mut<K: Component>(&mut self, handle: ComponentHandle<K>) -> Option<&mut K> {
        let pos = *self.index.get(&handle.kind)?;
        let slot = &mut self.slots[pos];
        if slot.generation != handle.generation {
            return None;
        }
        slot.component.as_deref_mut().and_then(downcast_mut::<K>)
    }

    /// Detach and return the component of kind `K`.
    ///
    /// Components after it move up one place in the attachment order.
    pub fn detach<K: Component>(&mut self) -> Option<K> {
        let pos = *self.index.get(&K::kind())?;
        if !self.slots[pos]
            .component
            .as_deref()
            .is_some_and(|c| downcast_ref::<K>(c).is_some())
        {
            return None;
        }

        let slot = self.slots.remove(pos);
        self.reindex();
        debug!(component = slot.name, "detached component");
        slot.component
            .and_then(|c| c.into_any().downcast::<K>().ok())
            .map(|boxed| *boxed)
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no component is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Component kinds in attachment order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.slots.iter().map(|s| s.kind)
    }

    /// Component names in attachment order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|s| s.name)
    }

    /// Lift the component at `pos` out of its slot so it can run with
    /// mutable access to its siblings.
    pub(crate) fn take(&mut self, pos: usize) -> Option<Box<dyn Component>> {
        self.slots.get_mut(pos)?.component.take()
    }

    /// Put a component lifted by [`take`](Self::take) back.
    pub(crate) fn restore(&mut self, pos: usize, component: Box<dyn Component>) {
        if let Some(slot) = self.slots.get_mut(pos) {
            slot.component = Some(component);
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, slot) in self.slots.iter().enumerate() {
            self.index.insert(slot.kind, pos);
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::Owner;

    #[derive(Debug, Clone, PartialEq)]
    struct Health {
        current: i64,
        max: i64,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }

        fn update(&mut self, _owner: &mut Owner<'_>) {}
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(&'static str);

    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }

        fn update(&mut self, _owner: &mut Owner<'_>) {}
    }

    #[test]
    fn test_attach_then_get_returns_constructed_value() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Health {
            current: 80,
            max: 100,
        });
        assert_eq!(
            registry.get::<Health>(),
            Some(&Health {
                current: 80,
                max: 100
            })
        );
    }

    #[test]
    fn test_get_absent_kind_returns_none() {
        let registry = ComponentRegistry::new();
        assert!(registry.get::<Health>().is_none());
        assert!(!registry.contains::<Health>());
    }

    #[test]
    fn test_attach_returns_mutable_reference() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Health { current: 1, max: 1 }).current = 50;
        assert_eq!(registry.get::<Health>().map(|h| h.current), Some(50));
    }

    #[test]
    fn test_reattach_replaces_and_moves_to_end() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Health { current: 1, max: 1 });
        registry.attach(Tag("enemy"));
        registry.attach(Health {
            current: 9,
            max: 9,
        });

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.count(Health::kind()), 1);
        assert_eq!(registry.get::<Health>().map(|h| h.current), Some(9));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Tag", "Health"]);
    }

    #[test]
    fn test_handle_is_invalidated_by_reattach() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Health { current: 1, max: 1 });
        let stale = registry.handle::<Health>().unwrap();
        assert_eq!(registry.resolve(stale).map(|h| h.current), Some(1));

        registry.attach(Health { current: 2, max: 2 });
        assert!(registry.resolve(stale).is_none());

        let fresh = registry.handle::<Health>().unwrap();
        assert_ne!(fresh, stale);
        registry.resolve_mut(fresh).unwrap().current = 3;
        assert_eq!(registry.get::<Health>().map(|h| h.current), Some(3));
    }

    #[test]
    fn test_detach_removes_and_invalidates() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Tag("a"));
        registry.attach(Health { current: 5, max: 5 });
        registry.attach(Tag("b"));
        let handle = registry.handle::<Health>().unwrap();

        assert_eq!(
            registry.detach::<Health>(),
            Some(Health { current: 5, max: 5 })
        );
        assert!(registry.resolve(handle).is_none());
        assert!(registry.detach::<Health>().is_none());
        assert_eq!(registry.get::<Tag>(), Some(&Tag("b")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_index_survives_interleaved_attach_and_detach() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Tag("first"));
        registry.attach(Health { current: 3, max: 3 });
        registry.detach::<Tag>();
        registry.attach(Tag("second"));

        assert_eq!(registry.get::<Health>().map(|h| h.current), Some(3));
        assert_eq!(registry.get::<Tag>(), Some(&Tag("second")));
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec![Health::kind(), Tag::kind()]);
    }

    #[test]
    fn test_taken_component_is_not_visible() {
        let mut registry = ComponentRegistry::new();
        registry.attach(Health { current: 1, max: 1 });
        let taken = registry.take(0).unwrap();
        assert!(registry.get::<Health>().is_none());
        registry.restore(0, taken);
        assert!(registry.get::<Health>().is_some());
    }
}
