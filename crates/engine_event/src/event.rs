//! Immutable game event values.
//!
//! An [`Event`] describes something that already happened: who caused it,
//! who it happened to, a numeric payload, and where. Events are handed to
//! observers and components by reference for the duration of one dispatch
//! and are never retained by the bus.

use serde::{Deserialize, Serialize};

/// The kind of a game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An entity moved; `location` carries the new place.
    PlayerMoved,
    /// An entity reached a new level; `amount` is the level.
    LevelUp,
    /// An item was picked up; `target` is the item name.
    ItemAcquired,
    /// An enemy was defeated; `target` is the enemy name.
    EnemyDefeated,
    /// Hit points changed; `amount` is the new value.
    HealthChanged,
    /// The game was saved.
    GameSaved,
    /// Damage dealt to `target`; `amount` is the damage.
    Damage,
    /// Healing applied to `target`; `amount` is the heal.
    Heal,
    /// `source` ran out of hit points.
    Died,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 9] = [
        EventKind::PlayerMoved,
        EventKind::LevelUp,
        EventKind::ItemAcquired,
        EventKind::EnemyDefeated,
        EventKind::HealthChanged,
        EventKind::GameSaved,
        EventKind::Damage,
        EventKind::Heal,
        EventKind::Died,
    ];

    /// Human-readable label for logs and diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            EventKind::PlayerMoved => "player moved",
            EventKind::LevelUp => "level up",
            EventKind::ItemAcquired => "item acquired",
            EventKind::EnemyDefeated => "enemy defeated",
            EventKind::HealthChanged => "health changed",
            EventKind::GameSaved => "game saved",
            EventKind::Damage => "damage",
            EventKind::Heal => "heal",
            EventKind::Died => "died",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Something that happened in the game.
///
/// Built with [`Event::new`] and the `with_*` helpers:
///
/// ```rust
/// use engine_event::{Event, EventKind};
///
/// let event = Event::new(EventKind::EnemyDefeated, "Hero")
///     .with_target("Goblin")
///     .with_amount(1)
///     .at("Dark Forest");
/// assert_eq!(event.target, "Goblin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Who caused it.
    pub source: String,
    /// Who or what it happened to. Empty when there is no target.
    pub target: String,
    /// Numeric payload (damage, level, count, new hit points...).
    pub amount: i64,
    /// Where it happened. Empty when unknown.
    pub location: String,
}

impl Event {
    /// Create an event with no target, a zero amount and no location.
    #[must_use]
    pub fn new(kind: EventKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            target: String::new(),
            amount: 0,
            location: String::new(),
        }
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the numeric payload.
    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    /// Set the location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Returns `true` if the event names a target.
    #[must_use]
    pub fn has_target(&self) -> bool {
        !self.target.is_empty()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)?;
        if self.has_target() {
            write!(f, " => {}", self.target)?;
        }
        Ok(())
    }
}
