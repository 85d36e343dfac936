//! Diagnostics reported by the bus instead of being propagated.
//!
//! Observer failures, panics, dropped observers and refused publishes all end
//! up here. [`TracingSink`] is the default; [`RecordingSink`] keeps them in
//! memory so a host or a test can inspect them.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::event::EventKind;
use crate::observer::ObserverId;

/// A non-fatal problem detected while dispatching events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An observer returned an error.
    ObserverFailed {
        /// Subscription that failed.
        id: ObserverId,
        /// Observer name.
        observer: String,
        /// Kind of the event being dispatched.
        kind: EventKind,
        /// Rendered error.
        error: String,
    },
    /// An observer panicked. The panic was contained at the bus boundary.
    ObserverPanicked {
        /// Subscription that panicked.
        id: ObserverId,
        /// Observer name.
        observer: String,
        /// Kind of the event being dispatched.
        kind: EventKind,
        /// Panic message, if it was a string.
        message: String,
    },
    /// An observer was still executing when a nested publish reached it.
    ObserverBusy {
        /// Subscription that was skipped.
        id: ObserverId,
        /// Kind of the nested event.
        kind: EventKind,
    },
    /// An observer was dropped without unsubscribing. It has been pruned.
    ObserverDropped {
        /// Subscription that was pruned.
        id: ObserverId,
    },
    /// A nested publish went past the configured depth and was refused.
    DepthExceeded {
        /// Kind of the refused event.
        kind: EventKind,
        /// Configured maximum depth.
        limit: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ObserverFailed {
                id,
                observer,
                kind,
                error,
            } => write!(f, "{observer} ({id}) failed on {kind}: {error}"),
            Diagnostic::ObserverPanicked {
                id,
                observer,
                kind,
                message,
            } => write!(f, "{observer} ({id}) panicked on {kind}: {message}"),
            Diagnostic::ObserverBusy { id, kind } => {
                write!(f, "{id} skipped for nested {kind}: already dispatching")
            }
            Diagnostic::ObserverDropped { id } => {
                write!(f, "{id} was dropped without unsubscribing")
            }
            Diagnostic::DepthExceeded { kind, limit } => {
                write!(f, "refused {kind}: publish depth limit {limit} reached")
            }
        }
    }
}

/// Receives bus diagnostics.
pub trait DiagnosticSink {
    /// Record one diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: logs every diagnostic at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        warn!(%diagnostic, "event bus diagnostic");
    }
}

/// Sink that keeps diagnostics in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Returns the number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        warn!(%diagnostic, "event bus diagnostic");
        self.entries.borrow_mut().push(diagnostic.clone());
    }
}
