//! # engine_event
//!
//! Decoupled event distribution for the component runtime.
//!
//! This crate provides:
//!
//! - [`Event`] / [`EventKind`]: immutable descriptions of what happened.
//! - [`Observer`]: the capability external systems implement to react.
//! - [`EventBus`]: ordered, synchronous fan-out with snapshot semantics and
//!   per-observer failure isolation.
//! - [`Subscription`]: RAII token that unsubscribes on drop.
//! - [`DiagnosticSink`]: where contained failures are reported.
//!
//! Nothing here knows about entities or components. A host wires the two
//! together.

pub mod bus;
pub mod diagnostic;
pub mod event;
pub mod observer;

pub use bus::{BusConfig, EventBus, PublishError, PublishReport, Subscription};
pub use diagnostic::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use event::{Event, EventKind};
pub use observer::{Observer, ObserverError, ObserverId, shared};
