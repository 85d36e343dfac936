//! The synchronous event bus.
//!
//! [`EventBus`] keeps an ordered list of weak observer references and fans
//! every published [`Event`] out to them on the caller's stack:
//!
//! 1. Refuse the publish if the nested publish depth is at its limit.
//! 2. Snapshot the subscriber list.
//! 3. Notify each snapshot member in subscription order.
//! 4. Report failures, panics and dead observers to the diagnostic sink.
//! 5. Prune observers that were dropped without unsubscribing.
//!
//! Subscribing or unsubscribing while a publish is running only affects the
//! next publish. The bus is single-threaded (`Rc`-based); clones share the
//! same subscriber list, so an observer may hold a clone and publish or
//! unsubscribe from inside `on_event`.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
use crate::event::{Event, EventKind};
use crate::observer::{Observer, ObserverId};

/// Default bound on nested publish calls.
pub const DEFAULT_MAX_PUBLISH_DEPTH: usize = 16;

/// Bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// How many publish calls may be in progress at once, counting the
    /// outermost one. A publish past this bound is refused.
    pub max_publish_depth: usize,
}

impl BusConfig {
    /// Override the nested publish bound.
    #[must_use]
    pub fn with_max_publish_depth(mut self, depth: usize) -> Self {
        self.max_publish_depth = depth;
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_publish_depth: DEFAULT_MAX_PUBLISH_DEPTH,
        }
    }
}

/// A publish the bus refused to start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// Too many publishes were already in progress.
    #[error("publish depth limit {limit} reached while publishing {kind}")]
    DepthExceeded {
        /// Kind of the refused event.
        kind: EventKind,
        /// Configured maximum depth.
        limit: usize,
    },
}

/// Outcome of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Observers that handled the event successfully.
    pub delivered: usize,
    /// Observers that returned an error or panicked.
    pub failed: usize,
    /// Observers that were dropped or busy and therefore not called.
    pub skipped: usize,
}

impl PublishReport {
    /// Number of observers that were actually called.
    #[must_use]
    pub fn notified(&self) -> usize {
        self.delivered + self.failed
    }
}

struct Subscriber {
    id: ObserverId,
    observer: Weak<RefCell<dyn Observer>>,
}

struct BusShared {
    config: BusConfig,
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
    sink: RefCell<Rc<dyn DiagnosticSink>>,
}

impl BusShared {
    fn remove(&self, id: ObserverId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        match subscribers.iter().position(|s| s.id == id) {
            Some(pos) => {
                subscribers.remove(pos);
                debug!(%id, count = subscribers.len(), "observer unsubscribed");
                true
            }
            None => false,
        }
    }
}

/// Restores the publish depth when a dispatch ends.
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Ordered, synchronous fan-out of events to observers.
///
/// # Examples
///
/// ```rust
/// use engine_event::{shared, Event, EventBus, EventKind, Observer, ObserverError};
///
/// #[derive(Default)]
/// struct Counter(usize);
///
/// impl Observer for Counter {
///     fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
///
/// let bus = EventBus::new();
/// let counter = shared(Counter::default());
/// bus.subscribe(&counter);
/// bus.publish(&Event::new(EventKind::GameSaved, "system")).unwrap();
/// assert_eq!(counter.borrow().0, 1);
/// ```
#[derive(Clone)]
pub struct EventBus {
    shared: Rc<BusShared>,
}

impl EventBus {
    /// Create a bus with the default configuration and a [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with the given configuration and a [`TracingSink`].
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            shared: Rc::new(BusShared {
                config,
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                depth: Cell::new(0),
                sink: RefCell::new(Rc::new(TracingSink)),
            }),
        }
    }

    /// Replace the diagnostic sink.
    #[must_use]
    pub fn with_sink(self, sink: impl DiagnosticSink + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    /// Replace the diagnostic sink on a live bus.
    pub fn set_sink(&self, sink: impl DiagnosticSink + 'static) {
        *self.shared.sink.borrow_mut() = Rc::new(sink);
    }

    /// Returns the bus configuration.
    #[must_use]
    pub fn config(&self) -> BusConfig {
        self.shared.config
    }

    /// Subscribe an observer.
    ///
    /// Appends the observer to the end of the dispatch order. Subscribing an
    /// observer that is already subscribed returns its existing id and does
    /// not change the order. The bus keeps only a weak reference; the caller
    /// must [`unsubscribe`](Self::unsubscribe) before dropping the observer
    /// or use [`subscribe_scoped`](Self::subscribe_scoped).
    pub fn subscribe<O: Observer + 'static>(&self, observer: &Rc<RefCell<O>>) -> ObserverId {
        let target = Rc::as_ptr(observer).cast::<()>();
        let mut subscribers = self.shared.subscribers.borrow_mut();
        if let Some(existing) = subscribers
            .iter()
            .find(|s| s.observer.as_ptr().cast::<()>() == target)
        {
            return existing.id;
        }

        let erased: Rc<RefCell<dyn Observer>> = observer.clone();
        let id = ObserverId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);
        subscribers.push(Subscriber {
            id,
            observer: Rc::downgrade(&erased),
        });
        debug!(%id, count = subscribers.len(), "observer subscribed");
        id
    }

    /// Subscribe an observer and return a token that unsubscribes it when
    /// dropped.
    ///
    /// If the observer was already subscribed, the token refers to the
    /// existing subscription.
    pub fn subscribe_scoped<O: Observer + 'static>(
        &self,
        observer: &Rc<RefCell<O>>,
    ) -> Subscription {
        let id = self.subscribe(observer);
        Subscription {
            bus: Rc::downgrade(&self.shared),
            id,
            armed: true,
        }
    }

    /// Unsubscribe an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe<O: Observer + 'static>(&self, observer: &Rc<RefCell<O>>) -> bool {
        let target = Rc::as_ptr(observer).cast::<()>();
        let id = self
            .shared
            .subscribers
            .borrow()
            .iter()
            .find(|s| s.observer.as_ptr().cast::<()>() == target)
            .map(|s| s.id);
        match id {
            Some(id) => self.shared.remove(id),
            None => false,
        }
    }

    /// Unsubscribe by id. Returns `false` if the id is not subscribed.
    pub fn unsubscribe_id(&self, id: ObserverId) -> bool {
        self.shared.remove(id)
    }

    /// Returns `true` if the observer is currently subscribed.
    #[must_use]
    pub fn is_subscribed<O: Observer + 'static>(&self, observer: &Rc<RefCell<O>>) -> bool {
        let target = Rc::as_ptr(observer).cast::<()>();
        self.shared
            .subscribers
            .borrow()
            .iter()
            .any(|s| s.observer.as_ptr().cast::<()>() == target)
    }

    /// Returns the number of subscriptions, including ones whose observer
    /// has been dropped but not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    /// Returns the number of publish calls currently in progress.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.shared.depth.get()
    }

    /// Publish an event to every current subscriber, in subscription order.
    ///
    /// Observer errors and panics are reported to the diagnostic sink and
    /// never interrupt the remaining notifications.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::DepthExceeded`] without notifying anyone when
    /// the nested publish bound is reached.
    pub fn publish(&self, event: &Event) -> Result<PublishReport, PublishError> {
        let limit = self.shared.config.max_publish_depth;
        let depth = self.shared.depth.get();
        if depth >= limit {
            self.report(Diagnostic::DepthExceeded {
                kind: event.kind,
                limit,
            });
            return Err(PublishError::DepthExceeded {
                kind: event.kind,
                limit,
            });
        }

        let snapshot: Vec<(ObserverId, Weak<RefCell<dyn Observer>>)> = self
            .shared
            .subscribers
            .borrow()
            .iter()
            .map(|s| (s.id, s.observer.clone()))
            .collect();

        debug!(
            kind = %event.kind,
            source = %event.source,
            target = %event.target,
            subscribers = snapshot.len(),
            depth,
            "publishing event"
        );

        let mut report = PublishReport::default();
        if snapshot.is_empty() {
            return Ok(report);
        }

        self.shared.depth.set(depth + 1);
        let _depth = DepthGuard(&self.shared.depth);

        let mut dead = Vec::new();
        for (id, weak) in snapshot {
            let Some(strong) = weak.upgrade() else {
                report.skipped += 1;
                dead.push(id);
                continue;
            };
            let Ok(mut observer) = strong.try_borrow_mut() else {
                report.skipped += 1;
                self.report(Diagnostic::ObserverBusy {
                    id,
                    kind: event.kind,
                });
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event))) {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    trace!(%id, observer = observer.name(), "observer notified");
                }
                Ok(Err(error)) => {
                    report.failed += 1;
                    self.report(Diagnostic::ObserverFailed {
                        id,
                        observer: observer.name().to_string(),
                        kind: event.kind,
                        error: error.to_string(),
                    });
                }
                Err(payload) => {
                    report.failed += 1;
                    self.report(Diagnostic::ObserverPanicked {
                        id,
                        observer: observer.name().to_string(),
                        kind: event.kind,
                        message: panic_message(&*payload),
                    });
                }
            }
        }

        if !dead.is_empty() {
            self.shared
                .subscribers
                .borrow_mut()
                .retain(|s| !dead.contains(&s.id));
            for id in dead {
                self.report(Diagnostic::ObserverDropped { id });
            }
        }

        Ok(report)
    }

    fn report(&self, diagnostic: Diagnostic) {
        let sink = Rc::clone(&self.shared.sink.borrow());
        sink.report(&diagnostic);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.shared.config)
            .field("subscribers", &self.subscriber_count())
            .field("depth", &self.depth())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// RAII subscription token returned by [`EventBus::subscribe_scoped`].
///
/// Dropping the token unsubscribes the observer. Dropping it after the bus
/// itself is gone is a no-op.
#[must_use = "dropping a Subscription unsubscribes the observer immediately"]
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<BusShared>,
    id: ObserverId,
    armed: bool,
}

impl Subscription {
    /// Returns the subscription id.
    #[must_use]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Keep the subscription alive past this token. The caller takes over
    /// the unsubscribe obligation.
    pub fn detach(mut self) -> ObserverId {
        self.armed = false;
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.armed
            && let Some(shared) = self.bus.upgrade()
        {
            shared.remove(self.id);
        }
    }
}

impl std::fmt::Debug for BusShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusShared")
            .field("config", &self.config)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::RecordingSink;
    use crate::observer::{ObserverError, shared};

    /// Appends its label to a shared journal on every event.
    struct Recorder {
        label: &'static str,
        journal: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Observer for Recorder {
        fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
            self.journal.borrow_mut().push(self.label);
            Ok(())
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    fn recorder(
        label: &'static str,
        journal: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Rc<RefCell<Recorder>> {
        shared(Recorder {
            label,
            journal: Rc::clone(journal),
        })
    }

    struct Failing;

    impl Observer for Failing {
        fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
            Err(ObserverError::failed("disk full"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Observer for Panicking {
        fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
            panic!("observer exploded");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn saved() -> Event {
        Event::new(EventKind::GameSaved, "system")
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        let report = bus.publish(&saved()).unwrap();
        assert_eq!(report, PublishReport::default());
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &journal);
        let b = recorder("b", &journal);
        let c = recorder("c", &journal);

        let bus = EventBus::new();
        bus.subscribe(&a);
        bus.subscribe(&b);
        bus.subscribe(&c);

        let report = bus.publish(&saved()).unwrap();
        assert_eq!(report.delivered, 3);
        assert_eq!(*journal.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &journal);

        let bus = EventBus::new();
        let first = bus.subscribe(&a);
        let second = bus.subscribe(&a);
        assert_eq!(first, second);
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(&saved()).unwrap();
        assert_eq!(journal.borrow().len(), 1);
    }

    #[test]
    fn test_unsubscribe_absent_is_noop() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &journal);
        let bus = EventBus::new();
        assert!(!bus.unsubscribe(&a));
        assert!(!bus.unsubscribe_id(ObserverId(42)));

        bus.subscribe(&a);
        assert!(bus.unsubscribe(&a));
        assert!(!bus.is_subscribed(&a));
        assert!(!bus.unsubscribe(&a));
    }

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink::new();
        let bus = EventBus::new().with_sink(sink.clone());

        let failing = shared(Failing);
        let after = recorder("after", &journal);
        bus.subscribe(&failing);
        bus.subscribe(&after);

        let report = bus.publish(&saved()).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(*journal.borrow(), vec!["after"]);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert!(matches!(
            &entries[0],
            Diagnostic::ObserverFailed { observer, error, .. }
                if observer == "failing" && error == "disk full"
        ));
    }

    #[test]
    fn test_panicking_observer_is_contained() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink::new();
        let bus = EventBus::new().with_sink(sink.clone());

        let before = recorder("before", &journal);
        let panicking = shared(Panicking);
        let after = recorder("after", &journal);
        bus.subscribe(&before);
        bus.subscribe(&panicking);
        bus.subscribe(&after);

        let report = bus.publish(&saved()).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(*journal.borrow(), vec!["before", "after"]);
        assert!(matches!(
            &sink.entries()[0],
            Diagnostic::ObserverPanicked { message, .. } if message == "observer exploded"
        ));
        assert_eq!(bus.depth(), 0);
    }

    /// Unsubscribes another observer the first time it sees an event.
    struct Unsubscriber {
        bus: EventBus,
        victim: Option<ObserverId>,
    }

    impl Observer for Unsubscriber {
        fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
            if let Some(victim) = self.victim.take() {
                self.bus.unsubscribe_id(victim);
            }
            Ok(())
        }
    }

    #[test]
    fn test_unsubscribe_during_publish_uses_snapshot() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let bus = EventBus::new();
        let remover = shared(Unsubscriber {
            bus: bus.clone(),
            victim: None,
        });
        let victim = recorder("victim", &journal);

        bus.subscribe(&remover);
        let victim_id = bus.subscribe(&victim);
        remover.borrow_mut().victim = Some(victim_id);

        bus.publish(&saved()).unwrap();
        assert_eq!(*journal.borrow(), vec!["victim"]);
        assert!(!bus.is_subscribed(&victim));

        bus.publish(&saved()).unwrap();
        assert_eq!(journal.borrow().len(), 1);
    }

    /// Records one event, then unsubscribes itself.
    struct OneShot {
        bus: EventBus,
        id: Option<ObserverId>,
        journal: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Observer for OneShot {
        fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
            self.journal.borrow_mut().push("one-shot");
            if let Some(id) = self.id.take() {
                self.bus.unsubscribe_id(id);
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "one-shot"
        }
    }

    #[test]
    fn test_observer_unsubscribing_itself_finishes_current_publish() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let bus = EventBus::new();
        let one_shot = shared(OneShot {
            bus: bus.clone(),
            id: None,
            journal: Rc::clone(&journal),
        });
        let after = recorder("after", &journal);

        let id = bus.subscribe(&one_shot);
        one_shot.borrow_mut().id = Some(id);
        bus.subscribe(&after);

        let report = bus.publish(&saved()).unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(*journal.borrow(), vec!["one-shot", "after"]);
        assert!(!bus.is_subscribed(&one_shot));

        bus.publish(&saved()).unwrap();
        assert_eq!(*journal.borrow(), vec!["one-shot", "after", "after"]);
    }

    /// Subscribes a late observer from inside its handler.
    struct Recruiter {
        bus: EventBus,
        recruit: Rc<RefCell<Recorder>>,
    }

    impl Observer for Recruiter {
        fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
            self.bus.subscribe(&self.recruit);
            Ok(())
        }
    }

    #[test]
    fn test_subscribe_during_publish_applies_next_time() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let bus = EventBus::new();
        let recruit = recorder("recruit", &journal);
        let recruiter = shared(Recruiter {
            bus: bus.clone(),
            recruit: Rc::clone(&recruit),
        });
        bus.subscribe(&recruiter);

        bus.publish(&saved()).unwrap();
        assert!(journal.borrow().is_empty());
        assert!(bus.is_subscribed(&recruit));

        bus.publish(&saved()).unwrap();
        assert_eq!(*journal.borrow(), vec!["recruit"]);
    }

    #[test]
    fn test_scoped_subscription_unsubscribes_on_drop() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let bus = EventBus::new();
        let a = recorder("a", &journal);

        {
            let _token = bus.subscribe_scoped(&a);
            bus.publish(&saved()).unwrap();
        }
        bus.publish(&saved()).unwrap();
        assert_eq!(journal.borrow().len(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_detached_subscription_stays() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let bus = EventBus::new();
        let a = recorder("a", &journal);

        let id = bus.subscribe_scoped(&a).detach();
        bus.publish(&saved()).unwrap();
        assert_eq!(journal.borrow().len(), 1);
        assert!(bus.unsubscribe_id(id));
    }

    #[test]
    fn test_token_outliving_bus_is_harmless() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &journal);
        let bus = EventBus::new();
        let token = bus.subscribe_scoped(&a);
        drop(bus);
        drop(token);
    }

    #[test]
    fn test_dropped_observer_is_pruned_and_reported() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink::new();
        let bus = EventBus::new().with_sink(sink.clone());

        let gone = recorder("gone", &journal);
        let id = bus.subscribe(&gone);
        drop(gone);

        let report = bus.publish(&saved()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(sink.entries(), vec![Diagnostic::ObserverDropped { id }]);
    }

    /// Publishes a follow-up event from inside its handler.
    struct Relay {
        bus: EventBus,
        nested: Vec<Result<PublishReport, PublishError>>,
    }

    impl Observer for Relay {
        fn on_event(&mut self, event: &Event) -> Result<(), ObserverError> {
            if event.kind == EventKind::GameSaved {
                let follow_up = Event::new(EventKind::LevelUp, "relay").with_amount(1);
                self.nested.push(self.bus.publish(&follow_up));
            }
            Ok(())
        }
    }

    #[test]
    fn test_nested_publish_skips_busy_observer() {
        let sink = RecordingSink::new();
        let bus = EventBus::new().with_sink(sink.clone());
        let relay = shared(Relay {
            bus: bus.clone(),
            nested: Vec::new(),
        });
        let id = bus.subscribe(&relay);

        bus.publish(&saved()).unwrap();

        let nested = relay.borrow().nested.clone();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].as_ref().unwrap().skipped, 1);
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::ObserverBusy {
                id,
                kind: EventKind::LevelUp
            }]
        );
    }

    #[test]
    fn test_nested_publish_depth_is_bounded() {
        let sink = RecordingSink::new();
        let bus = EventBus::with_config(BusConfig::default().with_max_publish_depth(1))
            .with_sink(sink.clone());
        let relay = shared(Relay {
            bus: bus.clone(),
            nested: Vec::new(),
        });
        bus.subscribe(&relay);

        bus.publish(&saved()).unwrap();

        let nested = relay.borrow().nested.clone();
        assert_eq!(
            nested,
            vec![Err(PublishError::DepthExceeded {
                kind: EventKind::LevelUp,
                limit: 1
            })]
        );
        assert!(matches!(
            sink.entries()[0],
            Diagnostic::DepthExceeded { limit: 1, .. }
        ));
        assert_eq!(bus.depth(), 0);
    }

    #[test]
    fn test_bus_config_defaults_from_empty_json() {
        let config: BusConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_publish_depth, DEFAULT_MAX_PUBLISH_DEPTH);
    }
}
