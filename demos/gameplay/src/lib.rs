//! Example components and observers for the engine.
//!
//! Components implement [`engine_component::Component`] and talk to the
//! outside world only through events they emit. Observers implement
//! [`engine_event::Observer`] and never touch entities.

pub mod components;
pub mod observers;

pub use components::{Health, Movable, PlayerControl};
pub use observers::{Achievement, AchievementTracker, Autosave, GameLog, Hud};
