//! Example component definitions.
//!
//! [`Movable`] integrates velocity, [`PlayerControl`] steers a sibling
//! [`Movable`] from a scripted input pattern, and [`Health`] tracks hit
//! points and deactivates its owner when they run out.

use engine_component::{Component, Owner};
use engine_event::{Event, EventKind};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Position plus a constant per-tick velocity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Movable {
    /// Position in world units.
    pub position: Vec3,
    /// Displacement applied every tick.
    pub velocity: Vec3,
}

impl Movable {
    /// Create a movable at `position` travelling at `velocity`.
    #[must_use]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    /// A movable at rest at `position`.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO)
    }
}

impl Default for Movable {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Component for Movable {
    fn type_name() -> &'static str {
        "Movable"
    }

    fn update(&mut self, owner: &mut Owner<'_>) {
        if self.velocity == Vec3::ZERO {
            return;
        }
        self.position += self.velocity;

        let p = self.position;
        let location = format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z);
        debug!(entity = %owner.id(), %location, "moved");
        let name = owner.name().to_string();
        owner.emit(Event::new(EventKind::PlayerMoved, name).at(location));
    }
}

/// Scripted player input.
///
/// Every update polls "W" then "S". A key reads as pressed for 3 polls out
/// of every 30, so the two keys alternate in bursts. "W" raises and "S"
/// lowers the sibling [`Movable`]'s y-velocity by `acceleration`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlayerControl {
    /// Velocity change per key press.
    pub acceleration: f32,
    /// Input polls so far.
    polls: u64,
}

impl PlayerControl {
    /// Input polls per burst cycle.
    pub const CYCLE: u64 = 30;
    /// Polls per cycle that read as pressed.
    pub const PRESSED_POLLS: u64 = 3;

    /// Create a controller with the given acceleration.
    #[must_use]
    pub fn new(acceleration: f32) -> Self {
        Self {
            acceleration,
            polls: 0,
        }
    }

    /// Number of input polls so far.
    #[must_use]
    pub fn polls(&self) -> u64 {
        self.polls
    }

    fn key_pressed(&mut self) -> bool {
        self.polls += 1;
        self.polls % Self::CYCLE < Self::PRESSED_POLLS
    }
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Component for PlayerControl {
    fn type_name() -> &'static str {
        "PlayerControl"
    }

    fn update(&mut self, owner: &mut Owner<'_>) {
        if !owner.has::<Movable>() {
            return;
        }
        let mut dv = 0.0;
        if self.key_pressed() {
            debug!(entity = %owner.id(), "W pressed");
            dv += self.acceleration;
        }
        if self.key_pressed() {
            debug!(entity = %owner.id(), "S pressed");
            dv -= self.acceleration;
        }
        if dv != 0.0
            && let Some(movable) = owner.get_mut::<Movable>()
        {
            movable.velocity.y += dv;
        }
    }
}

/// Hit points with optional per-tick decay.
///
/// Responds to [`EventKind::Damage`] and [`EventKind::Heal`] broadcasts.
/// Emits [`EventKind::HealthChanged`] (amount = new value) on every change.
/// When hit points reach zero the owner is deactivated and
/// [`EventKind::Died`] is emitted once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    /// Current hit points.
    pub current: i64,
    /// Maximum hit points.
    pub max: i64,
    /// Hit points lost every update while alive.
    pub decay_per_tick: i64,
}

impl Health {
    /// Full health, no decay.
    #[must_use]
    pub fn full(max: i64) -> Self {
        Self {
            current: max,
            max,
            decay_per_tick: 0,
        }
    }

    /// Set the per-tick decay.
    #[must_use]
    pub fn with_decay(mut self, decay_per_tick: i64) -> Self {
        self.decay_per_tick = decay_per_tick;
        self
    }

    /// Returns `true` while hit points are above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Change hit points by `delta`, clamped to `0..=max`, and announce the
    /// result to the owner.
    fn change(&mut self, delta: i64, owner: &mut Owner<'_>) {
        if !self.is_alive() {
            return;
        }
        let before = self.current;
        self.current = self.current.saturating_add(delta).clamp(0, self.max);
        if self.current == before {
            return;
        }

        let name = owner.name().to_string();
        debug!(entity = %owner.id(), current = self.current, max = self.max, "health changed");
        owner.emit(Event::new(EventKind::HealthChanged, name.clone()).with_amount(self.current));

        if !self.is_alive() {
            info!(entity = %owner.id(), name = %name, "entity died");
            owner.deactivate();
            owner.emit(Event::new(EventKind::Died, name));
        }
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }

    fn update(&mut self, owner: &mut Owner<'_>) {
        if self.decay_per_tick > 0 {
            self.change(self.decay_per_tick.saturating_neg(), owner);
        }
    }

    fn handle_event(&mut self, event: &Event, owner: &mut Owner<'_>) {
        match event.kind {
            EventKind::Damage => {
                debug!(entity = %owner.id(), amount = event.amount, from = %event.source, "took damage");
                self.change(event.amount.saturating_neg(), owner);
            }
            EventKind::Heal => self.change(event.amount, owner),
            _ => {}
        }
    }
}
