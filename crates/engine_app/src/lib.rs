//! # engine_app
//!
//! Runs entities and wires them to the event bus. The [`World`] is the
//! surface a host application drives: create entities, attach components,
//! tick, publish, subscribe. [`TickLoop`] paces a world at a fixed rate.

mod config;
mod manager;
mod tick;
mod world;

pub use config::{ConfigError, EngineConfig};
pub use manager::{EntityManager, TickOutcome};
pub use tick::{TickConfig, TickLoop};
pub use world::{TickSummary, World, WorldError};
