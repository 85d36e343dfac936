//! The [`Observer`] contract and its error type.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind};

/// Identifies one subscription on an [`EventBus`](crate::EventBus).
///
/// Ids are allocated per bus and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Observer({})", self.0)
    }
}

/// Error returned by an observer that could not handle an event.
///
/// The bus never propagates this to the publisher; it is reported to the
/// bus's diagnostic sink and dispatch moves on to the next observer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The observer failed while handling the event.
    #[error("{0}")]
    Failed(String),

    /// The observer refuses this event.
    #[error("rejected {kind} event: {reason}")]
    Rejected {
        /// Kind of the rejected event.
        kind: EventKind,
        /// Why it was rejected.
        reason: String,
    },
}

impl ObserverError {
    /// Shorthand for [`ObserverError::Failed`].
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// An external capability that reacts to published events.
///
/// Observers are owned by whoever created them, typically as
/// `Rc<RefCell<O>>` (see [`shared`]). The bus only keeps weak references.
///
/// # Examples
///
/// ```rust
/// use engine_event::{Event, Observer, ObserverError};
///
/// #[derive(Default)]
/// struct Counter {
///     seen: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
///         self.seen += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// React to a published event.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError`] if the event could not be handled. The
    /// error only reaches the diagnostic sink.
    fn on_event(&mut self, event: &Event) -> Result<(), ObserverError>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Wrap an observer for subscription.
#[must_use]
pub fn shared<O: Observer>(observer: O) -> Rc<RefCell<O>> {
    Rc::new(RefCell::new(observer))
}
